//! Logging utilities and configuration for fetch-kaggle.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary through [`setup::init_logging`].

use tracing::Level;

/// Logging configuration for the pipeline.
///
/// Controls how much per-file and per-column detail the profiling and
/// inventory stages emit.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for pipeline components
    pub base_level: Level,
    /// Whether to log each column summary as it is computed
    pub log_column_details: bool,
    /// Whether to log file reads and writes
    pub log_file_operations: bool,
    /// Maximum length for logged field values (sample values can be long)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_column_details: false,
            log_file_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_column_details: true,
            log_file_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a quiet configuration that only surfaces warnings.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_column_details: false,
            log_file_operations: false,
            max_field_length: 128,
        }
    }
}

/// Macro for conditional column-level logging.
#[macro_export]
macro_rules! log_column {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional file operation logging.
#[macro_export]
macro_rules! log_file_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_file_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` characters.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        None => value.to_string(),
        Some((cut, _)) => format!("{}...(truncated)", &value[..cut]),
    }
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for the subscriber installed by the CLI.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside this crate
        pub level: Level,
        /// Log level for fetch-kaggle components specifically
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Creates a configuration for machine-readable logs.
        pub fn structured() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: true,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for fetch-kaggle components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},fetch_kaggle={},fetch_kaggle_cli={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Initializes logging, honouring `RUST_LOG` when it is set.
    ///
    /// Logs are written to stderr so command output on stdout stays clean.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use fetch_kaggle::logging::setup::{LoggingConfig, init_logging};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

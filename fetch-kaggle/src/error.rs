//! Error types for the fetch-kaggle pipeline.
//!
//! All fallible operations in this crate return [`FetchError`] through the
//! [`Result`] alias. Recoverable conditions that the pipeline reports as
//! "nothing to do" (a missing or malformed manifest) are modelled as
//! `Ok(None)` by the entry points rather than as errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for the fetch-kaggle library.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The download manifest could not be read or did not match the expected shape.
    #[error("Manifest error at {}: {message}", path.display())]
    Manifest {
        /// Path of the manifest file
        path: PathBuf,
        /// Detailed error message
        message: String,
    },

    /// A data file selected for profiling could not be read.
    #[error("Failed to read data file {}: {source}", path.display())]
    DataFile {
        /// Path of the data file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external dataset download failed.
    #[error("Dataset fetch failed: {0}")]
    Fetch(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No snapshot directory was found under the data root.
    #[error("No snapshot directories found under {}", root.display())]
    NoSnapshot { root: PathBuf },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, FetchError>`.
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Creates a new manifest error.
    pub fn manifest(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a new data file error.
    pub fn data_file(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::DataFile {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Returns true when the error came from reading a data file during profiling.
    pub fn is_data_file(&self) -> bool {
        matches!(self, Self::DataFile { .. })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<FetchError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            FetchError::Internal(inner) => FetchError::Internal(format!("{msg}: {inner}")),
            other => FetchError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                FetchError::Internal(inner) => FetchError::Internal(format!("{msg}: {inner}")),
                other => FetchError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_manifest_error_display() {
        let err = FetchError::manifest("/data/20240101/download_manifest.json", "missing field `files`");
        assert_eq!(
            err.to_string(),
            "Manifest error at /data/20240101/download_manifest.json: missing field `files`"
        );
    }

    #[test]
    fn test_data_file_error_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = FetchError::data_file("/data/a.csv", source);

        assert!(err.is_data_file());
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to read data file /data/a.csv"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: FetchError = parse.unwrap_err().into();
        assert!(matches!(err, FetchError::Serialization(_)));
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(FetchError::Internal("Something went wrong".to_string()))
        }

        let result = failing_operation().context("While writing profile");
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Internal error: While writing profile: Something went wrong"
        );
    }

    #[test]
    fn test_error_with_lazy_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = io.with_context(|| format!("creating {}", "reports")).unwrap_err();
        assert!(err.to_string().contains("creating reports"));
        assert!(err.to_string().contains("denied"));
    }
}

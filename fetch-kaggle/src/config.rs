//! Pipeline configuration.
//!
//! [`PipelineConfig`] is built once by the caller and passed explicitly to the
//! entry points that need paths or dataset identity. Nothing in the library
//! reads the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Default Kaggle dataset identifier.
pub const DEFAULT_DATASET_ID: &str = "erlichsefi/israeli-supermarkets-2024";

/// Default Kaggle dataset page.
pub const DEFAULT_DATASET_URL: &str =
    "https://www.kaggle.com/datasets/erlichsefi/israeli-supermarkets-2024";

/// Name of the manifest file written into every snapshot directory.
pub const MANIFEST_FILE_NAME: &str = "download_manifest.json";

/// Configuration shared by the download, inventory and profile workflows.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Kaggle dataset identifier (`owner/name`)
    pub dataset_id: String,
    /// Public URL of the dataset, recorded in the manifest
    pub dataset_url: String,
    /// Directory holding one `YYYYMMDD` sub-directory per snapshot
    pub data_root: PathBuf,
    /// Directory for Markdown inventory reports
    pub reports_dir: PathBuf,
    /// Upper bound on the external download command
    pub download_timeout: Duration,
    /// Executable used to download datasets
    pub kaggle_binary: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_id: DEFAULT_DATASET_ID.to_string(),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            data_root: PathBuf::from("./data/kaggle_raw"),
            reports_dir: PathBuf::from("./data/reports"),
            download_timeout: Duration::from_secs(10 * 60),
            kaggle_binary: "kaggle".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Path of the snapshot directory for a given `YYYYMMDD` date.
    pub fn snapshot_dir(&self, date: &str) -> PathBuf {
        self.data_root.join(date)
    }

    /// Default path of the inventory report for a given `YYYYMMDD` date.
    pub fn inventory_report_path(&self, date: &str) -> PathBuf {
        self.reports_dir.join(format!("kaggle_inventory_{date}.md"))
    }

    /// Dataset name, i.e. the last `/`-separated segment of the identifier.
    pub fn dataset_name(&self) -> &str {
        self.dataset_id
            .rsplit('/')
            .next()
            .unwrap_or(self.dataset_id.as_str())
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_id.trim().is_empty() {
            return Err(FetchError::Configuration(
                "dataset_id must not be empty".to_string(),
            ));
        }
        if self.download_timeout.is_zero() {
            return Err(FetchError::Configuration(
                "download_timeout must be greater than zero".to_string(),
            ));
        }
        if self.kaggle_binary.trim().is_empty() {
            return Err(FetchError::Configuration(
                "kaggle_binary must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Sets the dataset identifier.
    pub fn dataset_id(mut self, id: impl Into<String>) -> Self {
        self.config.dataset_id = id.into();
        self
    }

    /// Sets the dataset URL.
    pub fn dataset_url(mut self, url: impl Into<String>) -> Self {
        self.config.dataset_url = url.into();
        self
    }

    /// Sets the root directory for snapshots.
    pub fn data_root(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_root = path.as_ref().to_path_buf();
        self
    }

    /// Sets the report output directory.
    pub fn reports_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.reports_dir = path.as_ref().to_path_buf();
        self
    }

    /// Sets the download timeout.
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = timeout;
        self
    }

    /// Sets the executable used for downloads.
    pub fn kaggle_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.kaggle_binary = binary.into();
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Dataset fetchers.
//!
//! A [`DatasetFetcher`] fills a snapshot directory with the dataset's files.
//! [`KaggleCliFetcher`] shells out to the `kaggle` command line tool;
//! [`DryRunFetcher`] writes a tiny sample so the rest of the pipeline can run
//! without network access.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::config::PipelineConfig;
use crate::error::{FetchError, Result};

/// Name of the file written by [`DryRunFetcher`].
pub const DRY_RUN_FILE: &str = "sample.csv";

/// Contents of the file written by [`DryRunFetcher`].
pub const DRY_RUN_CONTENT: &str = "h\na\n";

/// Fetches a dataset into a directory.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Downloads `dataset_id` into `target_dir`, which already exists.
    async fn fetch(&self, dataset_id: &str, target_dir: &Path) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Downloads through `kaggle datasets download <id> -p <dir> --unzip`.
#[derive(Debug, Clone)]
pub struct KaggleCliFetcher {
    binary: String,
    timeout: Duration,
}

impl KaggleCliFetcher {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.kaggle_binary.clone(), config.download_timeout)
    }

    fn command(&self, dataset_id: &str, target_dir: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("datasets")
            .arg("download")
            .arg(dataset_id)
            .arg("-p")
            .arg(target_dir)
            .arg("--unzip")
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl DatasetFetcher for KaggleCliFetcher {
    #[instrument(skip(self), fields(binary = %self.binary))]
    async fn fetch(&self, dataset_id: &str, target_dir: &Path) -> Result<()> {
        debug!(timeout_secs = self.timeout.as_secs(), "Spawning download command");

        let output = tokio::time::timeout(self.timeout, self.command(dataset_id, target_dir).output())
            .await
            .map_err(|_| {
                FetchError::fetch(format!(
                    "download timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| FetchError::fetch(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::fetch(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        info!("Dataset downloaded");
        Ok(())
    }

    fn name(&self) -> &str {
        "kaggle-cli"
    }
}

/// Writes [`DRY_RUN_CONTENT`] to `sample.csv` unless the file already exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunFetcher;

#[async_trait]
impl DatasetFetcher for DryRunFetcher {
    async fn fetch(&self, _dataset_id: &str, target_dir: &Path) -> Result<()> {
        let sample = target_dir.join(DRY_RUN_FILE);
        if tokio::fs::try_exists(&sample).await? {
            debug!(path = %sample.display(), "Sample file already present");
            return Ok(());
        }
        tokio::fs::write(&sample, DRY_RUN_CONTENT).await?;
        info!(path = %sample.display(), "Wrote dry-run sample");
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_writes_sample_once() {
        let dir = tempfile::tempdir().unwrap();
        DryRunFetcher.fetch("any/dataset", dir.path()).await.unwrap();

        let sample = dir.path().join(DRY_RUN_FILE);
        assert_eq!(std::fs::read_to_string(&sample).unwrap(), "h\na\n");

        std::fs::write(&sample, "custom\n").unwrap();
        DryRunFetcher.fetch("any/dataset", dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&sample).unwrap(), "custom\n");
    }

    #[test]
    fn test_command_arguments() {
        let fetcher = KaggleCliFetcher::new("kaggle", Duration::from_secs(1));
        let command = fetcher.command("owner/data", Path::new("/tmp/out"));
        let std_command = command.as_std();
        let args: Vec<_> = std_command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(std_command.get_program(), "kaggle");
        assert_eq!(
            args,
            vec!["datasets", "download", "owner/data", "-p", "/tmp/out", "--unzip"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = KaggleCliFetcher::new("definitely-not-a-real-binary-xyz", Duration::from_secs(5));
        let err = fetcher.fetch("owner/data", dir.path()).await.unwrap_err();
        assert!(matches!(err, FetchError::Fetch(_)));
    }

    #[test]
    fn test_from_config() {
        let config = PipelineConfig::builder()
            .kaggle_binary("/opt/kaggle")
            .download_timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        let fetcher = KaggleCliFetcher::from_config(&config);
        assert_eq!(fetcher.binary, "/opt/kaggle");
        assert_eq!(fetcher.timeout, Duration::from_secs(30));
        assert_eq!(fetcher.name(), "kaggle-cli");
    }
}

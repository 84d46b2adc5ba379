//! The download stage: fetch a dataset into a dated snapshot directory and
//! record what arrived in its manifest.

pub mod fetch;
pub mod manifest;
pub mod process;
pub mod validate;

use std::path::PathBuf;

use chrono::{NaiveDate, SecondsFormat, Utc};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::paths::ensure_dir;

pub use fetch::{DatasetFetcher, DryRunFetcher, KaggleCliFetcher};
pub use manifest::create_manifest;
pub use process::{process_files, ProcessedFiles};
pub use validate::{validate_completion, ValidationReport};

/// Result of [`run_download`].
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// The `data_root/YYYYMMDD` snapshot directory
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
    pub files: u64,
    pub validation: ValidationReport,
}

impl DownloadOutcome {
    pub fn passed(&self) -> bool {
        self.validation.passed
    }
}

/// Formats a date as a snapshot directory name.
pub fn snapshot_name(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Downloads the configured dataset into `data_root/<today>`, writes its
/// manifest and validates the result.
///
/// A fetch failure is returned as an error before anything is processed. A
/// failed validation is reported through [`DownloadOutcome::validation`].
#[instrument(skip_all, fields(dataset = %config.dataset_id, fetcher = fetcher.name()))]
pub async fn run_download(
    config: &PipelineConfig,
    fetcher: &dyn DatasetFetcher,
    today: NaiveDate,
) -> Result<DownloadOutcome> {
    let directory = config.snapshot_dir(&snapshot_name(today));
    ensure_dir(&directory).await?;

    fetcher.fetch(&config.dataset_id, &directory).await?;

    let processed = process_files(&directory).await?;
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let manifest_path = create_manifest(&directory, &processed, &timestamp, config).await?;
    let validation = validate_completion(&directory).await?;

    info!(
        dir = %directory.display(),
        files = processed.total_files,
        passed = validation.passed,
        "Download stage complete"
    );
    Ok(DownloadOutcome {
        directory,
        manifest_path,
        files: processed.total_files,
        validation,
    })
}

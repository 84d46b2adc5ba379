//! Manifest creation for a processed snapshot.

use std::path::{Path, PathBuf};

use tracing::info;

use super::process::ProcessedFiles;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::manifest::{DatasetInfo, DownloadInfo, DownloadManifest};

/// Builds the manifest for `dir` without touching the filesystem.
///
/// The snapshot date is the directory's final path component.
pub fn build_manifest(
    dir: &Path,
    processed: &ProcessedFiles,
    timestamp: &str,
    config: &PipelineConfig,
) -> DownloadManifest {
    let date = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    DownloadManifest {
        dataset: DatasetInfo {
            name: config.dataset_name().to_string(),
            kaggle_id: config.dataset_id.clone(),
            url: config.dataset_url.clone(),
            download_timestamp: timestamp.to_string(),
        },
        download_info: DownloadInfo {
            date,
            directory: dir.display().to_string(),
            total_files: processed.total_files,
            total_size_mb: processed.total_size_mb,
            total_rows: processed.total_rows,
        },
        files: processed.files.clone(),
    }
}

/// Builds the manifest for `dir` and writes it as `download_manifest.json`.
pub async fn create_manifest(
    dir: impl AsRef<Path>,
    processed: &ProcessedFiles,
    timestamp: &str,
    config: &PipelineConfig,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let manifest = build_manifest(dir, processed, timestamp, config);
    let path = manifest.write(dir).await?;
    info!(
        path = %path.display(),
        files = manifest.files.len(),
        "Manifest written"
    );
    Ok(path)
}

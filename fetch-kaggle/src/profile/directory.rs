//! Snapshot-wide profiling.

use std::collections::HashSet;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use super::file::profile_file;
use super::select::select_representatives;
use super::types::{DataProfile, FailedFile, FileProfile, FileTarget};
use super::{FileErrorPolicy, ProfileOptions};
use crate::error::Result;
use crate::manifest::DownloadManifest;

/// Profiles the representative file of every family in a snapshot directory.
///
/// Returns `Ok(None)` when `dir/download_manifest.json` is missing or
/// malformed. Up to `options.max_concurrent_files` files are read at once;
/// profiles keep selection order either way. When a file cannot be read the
/// [`FileErrorPolicy`] decides between failing the run and recording the file
/// in [`DataProfile::failed_files`].
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub async fn profile_directory(
    dir: impl AsRef<Path>,
    options: &ProfileOptions,
) -> Result<Option<DataProfile>> {
    let dir = dir.as_ref();
    let Some(manifest) = DownloadManifest::try_load(dir).await else {
        return Ok(None);
    };

    let selection = select_representatives(&manifest.files);
    info!(
        files = manifest.files.len(),
        selected = selection.targets.len(),
        skipped = selection.skipped_families.len(),
        "Selected representative files"
    );

    let mut results = stream::iter(selection.targets)
        .map(|target| async move {
            let outcome = profile_file(&target, options).await;
            (target, outcome)
        })
        .buffered(options.max_concurrent_files.max(1));

    let mut profiles: Vec<FileProfile> = Vec::new();
    let mut failed_files: Vec<FailedFile> = Vec::new();

    while let Some((target, outcome)) = results.next().await {
        match outcome {
            Ok(profile) => profiles.push(profile),
            Err(err) => match options.on_file_error {
                FileErrorPolicy::Abort => return Err(err),
                FileErrorPolicy::Skip => {
                    warn!(file = %target.filename, error = %err, "Skipping unreadable file");
                    failed_files.push(failed(&target, &err.to_string()));
                }
            },
        }
    }

    let total_patterns = profiles
        .iter()
        .map(|p| p.family.as_str())
        .collect::<HashSet<_>>()
        .len();

    info!(
        profiles = profiles.len(),
        failed = failed_files.len(),
        "Directory profiled"
    );

    Ok(Some(DataProfile {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        source_directory: dir.display().to_string(),
        dataset_date: manifest.download_info.date,
        total_patterns,
        profiles,
        skipped_families: selection.skipped_families,
        failed_files,
    }))
}

fn failed(target: &FileTarget, error: &str) -> FailedFile {
    FailedFile {
        family: target.family.clone(),
        filename: target.filename.clone(),
        path: target.path.clone(),
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::test_support::{manifest, record};
    use crate::manifest::FileRecord;

    fn on_disk(dir: &Path, filename: &str, content: &str, rows: Option<u64>) -> FileRecord {
        let path = dir.join(filename);
        std::fs::write(&path, content).unwrap();
        FileRecord {
            path: path.display().to_string(),
            ..record(filename, rows)
        }
    }

    #[tokio::test]
    async fn test_missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = profile_directory(dir.path(), &ProfileOptions::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(DownloadManifest::path_in(dir.path()), "{not json").unwrap();
        let result = profile_directory(dir.path(), &ProfileOptions::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_minimal_manifest_is_profiled() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("promo_file_rami_20240101.csv");
        std::fs::write(&csv_path, "id,desc\n7,sale\n").unwrap();
        let minimal = serde_json::json!({
            "download_info": { "date": "20240101" },
            "files": [{
                "filename": "promo_file_rami_20240101.csv",
                "path": csv_path.display().to_string(),
                "row_count": 1.0
            }]
        });
        std::fs::write(DownloadManifest::path_in(dir.path()), minimal.to_string()).unwrap();

        let profile = profile_directory(dir.path(), &ProfileOptions::default())
            .await
            .unwrap()
            .expect("minimal manifest is usable");
        assert_eq!(profile.dataset_date, "20240101");
        assert_eq!(profile.profiles.len(), 1);
        assert_eq!(profile.profiles[0].row_count, 1);
        assert_eq!(profile.profiles[0].columns.len(), 2);
    }

    #[tokio::test]
    async fn test_profiles_one_file_per_family() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            on_disk(dir.path(), "price_file_a_20240101.csv", "p\n1\n", Some(1)),
            on_disk(dir.path(), "price_file_b_20240101.csv", "p\n1\n2\n", Some(2)),
            on_disk(dir.path(), "store_file_a_20240101.csv", "s\nx\n", Some(1)),
            record("promo_file_a_20240101.csv", None),
        ];
        manifest(files).write(dir.path()).await.unwrap();

        let profile = profile_directory(dir.path(), &ProfileOptions::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.dataset_date, "20240101");
        assert_eq!(profile.total_patterns, 2);
        assert_eq!(profile.profiles.len(), 2);
        assert_eq!(profile.profiles[0].family, "price");
        assert_eq!(profile.profiles[0].chain, "b");
        assert_eq!(profile.profiles[1].family, "store");
        assert_eq!(profile.skipped_families, vec!["promo".to_string()]);
        assert!(profile.failed_files.is_empty());
        assert!(profile.generated_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_unreadable_file_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            on_disk(dir.path(), "store_file_a_20240101.csv", "s\nx\n", Some(1)),
            record("price_file_a_20240101.csv", Some(10)),
        ];
        manifest(files).write(dir.path()).await.unwrap();

        let err = profile_directory(dir.path(), &ProfileOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_data_file());
    }

    #[tokio::test]
    async fn test_skip_policy_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            record("price_file_a_20240101.csv", Some(10)),
            on_disk(dir.path(), "store_file_a_20240101.csv", "s\nx\n", Some(1)),
        ];
        manifest(files).write(dir.path()).await.unwrap();

        let options = ProfileOptions::builder()
            .on_file_error(FileErrorPolicy::Skip)
            .build()
            .unwrap();
        let profile = profile_directory(dir.path(), &options).await.unwrap().unwrap();

        assert_eq!(profile.profiles.len(), 1);
        assert_eq!(profile.profiles[0].family, "store");
        assert_eq!(profile.total_patterns, 1);
        assert_eq!(profile.failed_files.len(), 1);
        assert_eq!(profile.failed_files[0].family, "price");
    }

    #[tokio::test]
    async fn test_concurrent_profiling_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let families = ["store", "price", "promo", "price_full", "promo_full"];
        let files: Vec<_> = families
            .iter()
            .map(|family| {
                on_disk(
                    dir.path(),
                    &format!("{family}_file_x_20240101.csv"),
                    "c\n1\n",
                    Some(1),
                )
            })
            .collect();
        manifest(files).write(dir.path()).await.unwrap();

        let options = ProfileOptions::builder()
            .max_concurrent_files(4)
            .build()
            .unwrap();
        let profile = profile_directory(dir.path(), &options).await.unwrap().unwrap();
        let order: Vec<_> = profile.profiles.iter().map(|p| p.family.as_str()).collect();
        assert_eq!(order, families);
    }
}

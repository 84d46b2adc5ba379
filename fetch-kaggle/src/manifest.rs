//! The download manifest persisted in every snapshot directory.
//!
//! The manifest is produced by the download stage and consumed read-only by
//! the inventory and profiling stages. Its JSON shape is shared with external
//! tooling, so field names follow the on-disk format.
//!
//! Reading is lenient: only `download_info.date` and each file's `filename`
//! and `path` are required. Counts may be written as integral floats (`12.0`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::config::MANIFEST_FILE_NAME;
use crate::error::{FetchError, Result};

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Dataset identity recorded at download time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetInfo {
    pub name: String,
    pub kaggle_id: String,
    pub url: String,
    /// ISO 8601 timestamp of the download
    pub download_timestamp: String,
}

/// Snapshot-level totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Snapshot date (`YYYYMMDD`)
    pub date: String,
    #[serde(default)]
    pub directory: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub total_files: u64,
    #[serde(default)]
    pub total_size_mb: f64,
    #[serde(default, deserialize_with = "whole_number")]
    pub total_rows: u64,
}

/// One physical file in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    /// Path of the file as recorded by the download stage
    pub path: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub size_bytes: u64,
    #[serde(default)]
    pub size_mb: f64,
    /// Lowercase hex SHA-256 digest of the file contents
    #[serde(default)]
    pub sha256: String,
    /// Data rows excluding the header; `None` when counting failed
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub row_count: Option<u64>,
}

/// A JSON count written either as an integer or as a float.
#[derive(Deserialize)]
#[serde(untagged)]
enum WholeNumber {
    Int(u64),
    Float(f64),
}

impl WholeNumber {
    fn into_u64<E: serde::de::Error>(self) -> std::result::Result<u64, E> {
        match self {
            Self::Int(n) => Ok(n),
            Self::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
            Self::Float(f) => Err(E::custom(format!(
                "expected a non-negative whole number, got {f}"
            ))),
        }
    }
}

fn whole_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    WholeNumber::deserialize(deserializer)?.into_u64()
}

fn optional_whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WholeNumber>::deserialize(deserializer)?
        .map(WholeNumber::into_u64)
        .transpose()
}

impl FileRecord {
    /// True when `sha256` is a 64-character lowercase hex digest.
    pub fn has_valid_checksum(&self) -> bool {
        self.sha256.len() == SHA256_HEX_LEN
            && self
                .sha256
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

/// The full manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadManifest {
    #[serde(default)]
    pub dataset: DatasetInfo,
    pub download_info: DownloadInfo,
    pub files: Vec<FileRecord>,
}

impl DownloadManifest {
    /// Path of the manifest inside a snapshot directory.
    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(MANIFEST_FILE_NAME)
    }

    /// Parses a manifest from JSON text.
    pub fn from_json(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| FetchError::manifest(path, e.to_string()))
    }

    /// Loads `download_manifest.json` from a snapshot directory.
    ///
    /// Both a missing file and malformed JSON surface as [`FetchError::Manifest`].
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path_in(dir);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::manifest(&path, e.to_string()))?;
        let manifest = Self::from_json(&path, &content)?;
        debug!(
            path = %path.display(),
            files = manifest.files.len(),
            "Loaded download manifest"
        );
        Ok(manifest)
    }

    /// Loads the manifest, mapping any failure to `None`.
    ///
    /// This is the "manifest unavailable" signal used by the inventory and
    /// profile workflows.
    pub async fn try_load(dir: impl AsRef<Path>) -> Option<Self> {
        match Self::load(dir).await {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                tracing::warn!(error = %err, "Manifest unavailable");
                None
            }
        }
    }

    /// Writes the manifest as pretty-printed JSON and returns its path.
    pub async fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = Self::path_in(dir);
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    const SAMPLE: &str = r#"{
        "dataset": {
            "name": "israeli-supermarkets-2024",
            "kaggle_id": "erlichsefi/israeli-supermarkets-2024",
            "url": "https://www.kaggle.com/datasets/erlichsefi/israeli-supermarkets-2024",
            "download_timestamp": "2024-01-01T10:00:00.000Z"
        },
        "download_info": {
            "date": "20240101",
            "directory": "data/kaggle_raw/20240101",
            "total_files": 2,
            "total_size_mb": 1.5,
            "total_rows": 100
        },
        "files": [
            {
                "filename": "price_file_rami_20240101.csv",
                "path": "data/kaggle_raw/20240101/price_file_rami_20240101.csv",
                "size_bytes": 1048576,
                "size_mb": 1.0,
                "sha256": "0000000000000000000000000000000000000000000000000000000000000000",
                "row_count": 100
            },
            {
                "filename": "store_file_rami_20240101.csv",
                "path": "data/kaggle_raw/20240101/store_file_rami_20240101.csv",
                "size_bytes": 524288,
                "size_mb": 0.5,
                "sha256": "abc",
                "row_count": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = DownloadManifest::from_json("m.json", SAMPLE).unwrap();
        assert_eq!(manifest.download_info.date, "20240101");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].row_count, Some(100));
        assert_eq!(manifest.files[1].row_count, None);
    }

    #[test]
    fn test_checksum_validation() {
        let manifest = DownloadManifest::from_json("m.json", SAMPLE).unwrap();
        assert!(manifest.files[0].has_valid_checksum());
        assert!(!manifest.files[1].has_valid_checksum());

        let mut upper = record("a.csv", Some(1));
        upper.sha256 = "A".repeat(SHA256_HEX_LEN);
        assert!(!upper.has_valid_checksum());
    }

    #[test]
    fn test_unknown_row_count_serializes_as_null() {
        let json = serde_json::to_value(record("a.csv", None)).unwrap();
        assert!(json["row_count"].is_null());
    }

    #[test]
    fn test_malformed_manifest_is_manifest_error() {
        let err = DownloadManifest::from_json("m.json", r#"{"files": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Manifest { .. }));
    }

    #[test]
    fn test_minimal_manifest_parses() {
        let minimal = r#"{
            "download_info": { "date": "20240101" },
            "files": [ { "filename": "promo_file_rami_20240101.csv", "path": "promo.csv", "row_count": 3 } ]
        }"#;
        let manifest = DownloadManifest::from_json("m.json", minimal).unwrap();
        assert_eq!(manifest.dataset, DatasetInfo::default());
        assert_eq!(manifest.download_info.total_files, 0);
        assert_eq!(manifest.files[0].row_count, Some(3));
        assert_eq!(manifest.files[0].size_bytes, 0);
        assert!(!manifest.files[0].has_valid_checksum());
    }

    #[test]
    fn test_counts_accept_integral_floats() {
        let json = SAMPLE
            .replace(r#""row_count": 100"#, r#""row_count": 100.0"#)
            .replace(r#""total_files": 2"#, r#""total_files": 2.0"#)
            .replace(r#""size_bytes": 524288"#, r#""size_bytes": 5.24288e5"#);
        let manifest = DownloadManifest::from_json("m.json", &json).unwrap();
        assert_eq!(manifest.files[0].row_count, Some(100));
        assert_eq!(manifest.download_info.total_files, 2);
        assert_eq!(manifest.files[1].size_bytes, 524288);
        assert_eq!(manifest.files[1].row_count, None);
    }

    #[test]
    fn test_fractional_or_negative_counts_are_rejected() {
        for bad in [r#""row_count": 1.5"#, r#""row_count": -1"#] {
            let json = SAMPLE.replace(r#""row_count": 100"#, bad);
            let err = DownloadManifest::from_json("m.json", &json).unwrap_err();
            assert!(matches!(err, FetchError::Manifest { .. }), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(vec![record("promo_file_rami_20240101.csv", Some(7))]);

        let path = manifest.write(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));

        let loaded = DownloadManifest::load(dir.path()).await.unwrap();
        assert_eq!(loaded, manifest);
    }

    #[tokio::test]
    async fn test_try_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DownloadManifest::try_load(dir.path()).await.is_none());
    }
}

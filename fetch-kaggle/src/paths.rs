//! Snapshot directory helpers.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ErrorContext, FetchError, Result};

static SNAPSHOT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("snapshot name pattern is valid"));

/// True when `name` looks like a `YYYYMMDD` snapshot directory name.
pub fn is_snapshot_name(name: &str) -> bool {
    SNAPSHOT_NAME.is_match(name)
}

/// Creates `dir` and any missing parents.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))
}

/// Returns the most recent snapshot directory under `root`.
///
/// Candidates are sub-directories named with exactly eight digits; the
/// lexicographically greatest wins.
pub async fn find_latest_snapshot(root: impl AsRef<Path>) -> Result<PathBuf> {
    let root = root.as_ref();
    let no_snapshot = || FetchError::NoSnapshot {
        root: root.to_path_buf(),
    };

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_snapshot()),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<String> = None;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if is_snapshot_name(&name) && latest.as_deref().map_or(true, |l| name.as_str() > l) {
            latest = Some(name);
        }
    }

    latest.map(|name| root.join(name)).ok_or_else(no_snapshot)
}

//! Per-file metadata for a freshly downloaded snapshot.

use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::manifest::FileRecord;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Metadata for every CSV file in a snapshot directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedFiles {
    pub files: Vec<FileRecord>,
    pub total_files: u64,
    pub total_size_mb: f64,
    /// Unknown row counts contribute 0
    pub total_rows: u64,
}

/// Rounds to six decimal places.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Lists `*.csv` files directly inside `dir`, matching the extension
/// case-insensitively, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_text = dir
        .to_str()
        .ok_or_else(|| FetchError::Internal(format!("non UTF-8 path: {}", dir.display())))?;
    // the directory part must match literally
    let pattern = format!("{}/*.csv", glob::Pattern::escape(dir_text));
    debug!(pattern = %pattern, "Listing CSV files");

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let mut files: Vec<PathBuf> = glob_with(&pattern, options)
        .map_err(|e| FetchError::Internal(format!("invalid glob pattern: {e}")))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Unreadable directory entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Streams a file through SHA-256 and returns the lowercase hex digest.
pub async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Counts data rows: lines minus the header line.
///
/// `\n`, `\r` and `\r\n` each end a line. A final line without a line
/// break still counts; an empty file has zero rows.
pub async fn count_rows(path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut lines = 0u64;
    let mut after_cr = false;
    let mut open_line = false;
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        for &byte in &buffer[..read] {
            match byte {
                b'\n' if after_cr => after_cr = false,
                b'\n' | b'\r' => {
                    lines += 1;
                    open_line = false;
                    after_cr = byte == b'\r';
                }
                _ => {
                    open_line = true;
                    after_cr = false;
                }
            }
        }
    }
    if open_line {
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}

async fn process_file(path: &Path) -> Result<FileRecord> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size_bytes = tokio::fs::metadata(path).await?.len();
    let sha256 = sha256_file(path).await?;
    let row_count = match count_rows(path).await {
        Ok(rows) => Some(rows),
        Err(e) => {
            warn!(file = %filename, error = %e, "Row count unavailable");
            None
        }
    };

    Ok(FileRecord {
        filename,
        path: path.display().to_string(),
        size_bytes,
        size_mb: round6(size_bytes as f64 / BYTES_PER_MB),
        sha256,
        row_count,
    })
}

/// Builds a [`FileRecord`] for every CSV file in `dir`.
pub async fn process_files(dir: impl AsRef<Path>) -> Result<ProcessedFiles> {
    let dir = dir.as_ref();
    let mut processed = ProcessedFiles::default();
    let mut raw_size_mb = 0.0;

    for path in list_csv_files(dir)? {
        let record = process_file(&path).await?;
        debug!(file = %record.filename, rows = ?record.row_count, "Processed file");

        raw_size_mb += record.size_bytes as f64 / BYTES_PER_MB;
        processed.total_rows += record.row_count.unwrap_or(0);
        processed.files.push(record);
    }

    processed.total_files = processed.files.len() as u64;
    processed.total_size_mb = round6(raw_size_mb);
    Ok(processed)
}

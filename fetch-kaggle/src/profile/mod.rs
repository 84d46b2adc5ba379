//! Schema profiling of a dataset snapshot.
//!
//! Profiling works on representatives rather than every file:
//!
//! 1. [`select::select_representatives`] picks the file with the most rows in
//!    each family.
//! 2. [`file::profile_file`] parses each representative with the lenient
//!    reader in [`csv`] and summarises its columns with [`column`].
//! 3. [`directory::profile_directory`] ties both together over a snapshot's
//!    manifest and stamps the resulting [`DataProfile`].
//!
//! # Example
//!
//! ```rust,no_run
//! use fetch_kaggle::profile::{profile_directory, ProfileOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let options = ProfileOptions::builder().max_concurrent_files(4).build().unwrap();
//! match profile_directory("data/kaggle_raw/20240101", &options).await.unwrap() {
//!     Some(profile) => println!("{} families profiled", profile.total_patterns),
//!     None => eprintln!("manifest missing or invalid"),
//! }
//! # })
//! ```

pub mod column;
pub mod csv;
pub mod directory;
pub mod file;
pub mod select;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::{FetchError, Result};
use crate::logging::LogConfig;
use crate::manifest::DownloadManifest;

pub use column::{coerce_cell, summarize_column};
pub use csv::{parse_csv, parse_csv_with, CsvOptions, CsvTable};
pub use directory::profile_directory;
pub use file::{profile_content, profile_file};
pub use select::{select_representatives, Selection};
pub use types::{CellValue, ColumnSummary, DataProfile, DataType, FailedFile, FileProfile, FileTarget};

/// What to do when a representative file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileErrorPolicy {
    /// Fail the whole run with the file's error
    #[default]
    Abort,
    /// Record the file in `failed_files` and continue
    Skip,
}

/// Options for a profiling run.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Maximum number of files read concurrently
    pub max_concurrent_files: usize,
    pub on_file_error: FileErrorPolicy,
    pub csv: CsvOptions,
    pub log: LogConfig,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            max_concurrent_files: 1,
            on_file_error: FileErrorPolicy::Abort,
            csv: CsvOptions::default(),
            log: LogConfig::default(),
        }
    }
}

impl ProfileOptions {
    pub fn builder() -> ProfileOptionsBuilder {
        ProfileOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`ProfileOptions`].
#[derive(Debug, Clone)]
pub struct ProfileOptionsBuilder {
    options: ProfileOptions,
}

impl ProfileOptionsBuilder {
    /// Sets how many files may be read at once.
    pub fn max_concurrent_files(mut self, limit: usize) -> Self {
        self.options.max_concurrent_files = limit;
        self
    }

    /// Sets the unreadable-file policy.
    pub fn on_file_error(mut self, policy: FileErrorPolicy) -> Self {
        self.options.on_file_error = policy;
        self
    }

    /// Sets the CSV reader options.
    pub fn csv(mut self, csv: CsvOptions) -> Self {
        self.options.csv = csv;
        self
    }

    /// Sets the logging detail for per-file and per-column events.
    pub fn log(mut self, log: LogConfig) -> Self {
        self.options.log = log;
        self
    }

    pub fn build(self) -> Result<ProfileOptions> {
        if self.options.max_concurrent_files == 0 {
            return Err(FetchError::Configuration(
                "max_concurrent_files must be at least 1".to_string(),
            ));
        }
        Ok(self.options)
    }
}

/// A profile written to disk.
#[derive(Debug, Clone)]
pub struct ProfileRun {
    pub profile: DataProfile,
    pub output_path: PathBuf,
}

/// Default location of the profile for a snapshot.
pub fn default_output_path(dir: impl AsRef<Path>, dataset_date: &str) -> PathBuf {
    dir.as_ref()
        .join("metadata")
        .join(format!("data_profile_{dataset_date}.json"))
}

/// Profiles `dir` and writes the result as pretty-printed JSON.
///
/// Without an explicit `output` the profile goes to
/// `dir/metadata/data_profile_<dataset_date>.json`. A missing or malformed
/// manifest is reported as [`FetchError::Manifest`].
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub async fn run_profile(
    dir: impl AsRef<Path>,
    output: Option<&Path>,
    options: &ProfileOptions,
) -> Result<ProfileRun> {
    let dir = dir.as_ref();
    let profile = profile_directory(dir, options).await?.ok_or_else(|| {
        FetchError::manifest(
            DownloadManifest::path_in(dir),
            "manifest is missing or invalid",
        )
    })?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(dir, &profile.dataset_date),
    };
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, serde_json::to_string_pretty(&profile)?).await?;

    info!(
        path = %output_path.display(),
        profiles = profile.profiles.len(),
        patterns = profile.total_patterns,
        "Profile written"
    );
    Ok(ProfileRun {
        profile,
        output_path,
    })
}

//! # fetch-kaggle - Kaggle dataset acquisition and profiling
//!
//! fetch-kaggle downloads a dated snapshot of a Kaggle dataset, records the
//! files it received in a manifest, and describes them in two ways:
//!
//! - an **inventory** that groups files by their naming pattern, chain and
//!   file type, rendered as a Markdown report;
//! - a **profile** of the schema of each file family (column types, null
//!   rates, cardinality, samples), written as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetch_kaggle::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let dir = "data/kaggle_raw/20240101";
//!
//! if let Some(analysis) = analyze_directory(dir).await? {
//!     println!("{} files in {} patterns", analysis.summary.total_files, analysis.pattern_count());
//! }
//!
//! if let Some(profile) = profile_directory(dir, &ProfileOptions::default()).await? {
//!     for file in &profile.profiles {
//!         println!("{} ({}): {} columns", file.family, file.chain, file.columns.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Snapshot layout
//!
//! ```text
//! data/kaggle_raw/
//! └── 20240101/
//!     ├── download_manifest.json
//!     ├── price_full_file_shufersal_20240101.csv
//!     ├── promo_file_rami_20240101.csv
//!     └── metadata/
//!         └── data_profile_20240101.json
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events and spans but never installs a
//! subscriber. Binaries call [`logging::setup::init_logging`].

pub mod config;
pub mod download;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod manifest;
pub mod paths;
pub mod pattern;
pub mod prelude;
pub mod profile;

//! Prelude for commonly used types and traits in fetch-kaggle.

pub use crate::config::PipelineConfig;
pub use crate::download::{DatasetFetcher, DryRunFetcher, KaggleCliFetcher};
pub use crate::error::{ErrorContext, FetchError, Result};
pub use crate::inventory::{analyze, analyze_directory, InventoryAnalysis, InventoryReport};
pub use crate::logging::LogConfig;
pub use crate::manifest::{DownloadManifest, FileRecord};
pub use crate::pattern::{classify, PatternInfo};
pub use crate::profile::{profile_directory, DataProfile, FileErrorPolicy, ProfileOptions};

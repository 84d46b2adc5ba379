//! Inventory aggregation over a snapshot's manifest.
//!
//! [`analyze`] groups file records by their date-normalised pattern template
//! and counts files per chain and per file type. Groups keep first-seen order;
//! ordering for presentation is the job of [`report`].

pub mod report;

use std::collections::BTreeMap;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::manifest::{DownloadManifest, FileRecord};
use crate::pattern::classify;

pub use report::{InventoryReport, ReportOptions};

/// Files sharing one pattern template.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternGroup {
    pub pattern: String,
    pub files: Vec<FileRecord>,
}

/// Snapshot-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_files: u64,
    pub total_size_mb: f64,
    /// Sum of known row counts; unknown counts contribute 0
    pub total_rows: u64,
}

/// Aggregate view of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryAnalysis {
    pub files: Vec<FileRecord>,
    /// Pattern groups in first-seen order
    #[serde(serialize_with = "serialize_groups")]
    pub patterns: Vec<PatternGroup>,
    pub chains: BTreeMap<String, u64>,
    #[serde(rename = "fileTypes")]
    pub file_types: BTreeMap<String, u64>,
    pub summary: InventorySummary,
}

impl InventoryAnalysis {
    /// Looks up a pattern group by its template.
    pub fn pattern(&self, template: &str) -> Option<&PatternGroup> {
        self.patterns.iter().find(|g| g.pattern == template)
    }

    /// Number of distinct pattern templates.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

fn serialize_groups<S>(groups: &[PatternGroup], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(groups.len()))?;
    for group in groups {
        map.serialize_entry(&group.pattern, &group.files)?;
    }
    map.end()
}

/// Groups records by pattern and aggregates counts and totals.
///
/// Every record lands in exactly one pattern group, so the group sizes always
/// sum to `records.len()`. Empty input yields empty maps and zero totals.
pub fn analyze(records: &[FileRecord]) -> InventoryAnalysis {
    let mut patterns: Vec<PatternGroup> = Vec::new();
    let mut chains: BTreeMap<String, u64> = BTreeMap::new();
    let mut file_types: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_size_mb = 0.0;
    let mut total_rows = 0u64;

    for record in records {
        let info = classify(&record.filename);

        match patterns.iter_mut().find(|g| g.pattern == info.pattern) {
            Some(group) => group.files.push(record.clone()),
            None => patterns.push(PatternGroup {
                pattern: info.pattern,
                files: vec![record.clone()],
            }),
        }

        *chains.entry(info.chain).or_insert(0) += 1;
        *file_types.entry(info.file_type).or_insert(0) += 1;

        total_size_mb += record.size_mb;
        total_rows += record.row_count.unwrap_or(0);
    }

    InventoryAnalysis {
        files: records.to_vec(),
        patterns,
        chains,
        file_types,
        summary: InventorySummary {
            total_files: records.len() as u64,
            total_size_mb,
            total_rows,
        },
    }
}

/// Loads the manifest in `dir` and analyzes it.
///
/// Returns `Ok(None)` when the manifest is missing or malformed.
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub async fn analyze_directory(dir: impl AsRef<Path>) -> Result<Option<InventoryAnalysis>> {
    let Some(manifest) = DownloadManifest::try_load(dir.as_ref()).await else {
        return Ok(None);
    };

    let analysis = analyze(&manifest.files);
    let nonstandard = manifest
        .files
        .iter()
        .filter(|f| !classify(&f.filename).is_standard())
        .count();
    if nonstandard > 0 {
        warn!(nonstandard, "Files outside the naming convention grouped as unknown");
    }
    info!(
        files = analysis.summary.total_files,
        patterns = analysis.pattern_count(),
        chains = analysis.chains.len(),
        file_types = analysis.file_types.len(),
        "Inventory analysis complete"
    );
    Ok(Some(analysis))
}

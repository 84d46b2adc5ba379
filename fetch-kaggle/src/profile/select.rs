//! Representative file selection.
//!
//! Dated copies of one family share a schema, so profiling one file per
//! family is enough. The file with the most rows is chosen.

use tracing::warn;

use super::types::FileTarget;
use crate::manifest::FileRecord;
use crate::pattern::classify;

/// Outcome of representative selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// One target per family, in first-seen family order
    pub targets: Vec<FileTarget>,
    /// Families whose files all have an unknown row count
    pub skipped_families: Vec<String>,
}

/// Picks one representative per family.
///
/// Records with an unknown row count are never selected. Within a family the
/// first record with the strictly greatest row count wins. The chain comes
/// from the chosen file's own name.
pub fn select_representatives(records: &[FileRecord]) -> Selection {
    let mut families: Vec<(String, Option<&FileRecord>)> = Vec::new();

    for record in records {
        let family = classify(&record.filename).family().to_string();
        let index = match families.iter().position(|(name, _)| *name == family) {
            Some(index) => index,
            None => {
                families.push((family, None));
                families.len() - 1
            }
        };

        let Some(rows) = record.row_count else {
            continue;
        };
        let best = &mut families[index].1;
        if best.map_or(true, |b| rows > b.row_count.unwrap_or(0)) {
            *best = Some(record);
        }
    }

    let mut selection = Selection::default();
    for (family, best) in families {
        match best {
            Some(record) => selection.targets.push(FileTarget {
                filename: record.filename.clone(),
                chain: classify(&record.filename).chain,
                family,
                path: record.path.clone(),
                row_count: record.row_count.unwrap_or(0),
            }),
            None => {
                warn!(family = %family, "No file with a known row count, family skipped");
                selection.skipped_families.push(family);
            }
        }
    }
    selection
}

//! Filename classification for dataset snapshot files.
//!
//! Files in the supermarket dataset follow the convention
//! `{file_type}_file_{chain}_{YYYYMMDD}.csv`. [`classify`] extracts the file
//! type (the "family"), the chain and a date-normalised template used to group
//! dated copies of the same logical file. It is the single classifier used by
//! both the inventory aggregator and the representative selector.
//!
//! # Example
//!
//! ```rust
//! use fetch_kaggle::pattern::classify;
//!
//! let info = classify("price_full_file_shufersal_20240101.csv");
//! assert_eq!(info.file_type, "price_full");
//! assert_eq!(info.chain, "shufersal");
//! assert_eq!(info.pattern, "price_full_file_shufersal_YYYYMMDD.csv");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel used for chain and file type when a filename does not follow the convention.
pub const UNKNOWN: &str = "unknown";

/// Placeholder substituted for the embedded date in pattern templates.
pub const DATE_PLACEHOLDER: &str = "YYYYMMDD";

// Both captures are lazy: the first `_file_` ends the file type and the chain
// runs up to the trailing date.
static STANDARD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)_file_(.+?)_([0-9]{8})\.csv$").expect("standard filename pattern is valid")
});

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{8}").expect("date pattern is valid"));

/// Classification of a single filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternInfo {
    /// Retail chain token, or [`UNKNOWN`]
    pub chain: String,
    /// File type / family token, or [`UNKNOWN`]
    pub file_type: String,
    /// Filename with its date replaced by [`DATE_PLACEHOLDER`]
    pub pattern: String,
}

impl PatternInfo {
    /// True when the filename matched the standard naming convention.
    pub fn is_standard(&self) -> bool {
        self.file_type != UNKNOWN || self.chain != UNKNOWN
    }

    /// The family this file belongs to; an alias for the file type.
    pub fn family(&self) -> &str {
        &self.file_type
    }
}

/// Classifies a filename into chain, file type and pattern template.
///
/// Never fails: filenames outside the convention get `unknown` for chain and
/// file type. If such a name still contains an 8-digit run, the first run is
/// replaced by `YYYYMMDD` in the template; otherwise the template is the
/// filename itself.
pub fn classify(filename: &str) -> PatternInfo {
    if let Some(caps) = STANDARD_PATTERN.captures(filename) {
        let file_type = &caps[1];
        let chain = &caps[2];
        return PatternInfo {
            chain: chain.to_string(),
            file_type: file_type.to_string(),
            pattern: format!("{file_type}_file_{chain}_{DATE_PLACEHOLDER}.csv"),
        };
    }

    PatternInfo {
        chain: UNKNOWN.to_string(),
        file_type: UNKNOWN.to_string(),
        pattern: DATE_PATTERN
            .replace(filename, DATE_PLACEHOLDER)
            .into_owned(),
    }
}

//! Value objects produced by the profiling stages.

use std::fmt;

use serde::{Serialize, Serializer};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A non-null cell after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Cell text that coerced to a number
    Number(f64),
    /// Cell text kept verbatim
    Text(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// True for the empty string, which counts as null.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// String form used for distinct-value counting.
    ///
    /// Integral numbers print without a fractional part, so the number `1`
    /// and the text `"1"` share a key.
    pub fn to_key(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(n) => serialize_number(n, serializer),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // exponent form with an explicit sign, e.g. `1e+21`
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Writes integral numbers as JSON integers and non-finite numbers as `null`.
pub(crate) fn serialize_number<S>(n: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let n = *n;
    if !n.is_finite() {
        serializer.serialize_none()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

fn serialize_optional_number<S>(n: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match n {
        Some(n) => serialize_number(n, serializer),
        None => serializer.serialize_none(),
    }
}

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Every non-null value is a number
    Numeric,
    /// Anything else, including columns with no values
    String,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::String => f.write_str("string"),
        }
    }
}

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: DataType,
    pub null_count: u64,
    /// `null_count` over the declared row count of the file
    #[serde(serialize_with = "serialize_number")]
    pub null_rate: f64,
    pub unique_count: u64,
    /// Up to three non-null values in first-seen order
    pub sample_values: Vec<CellValue>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_number"
    )]
    pub min: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_number"
    )]
    pub max: Option<f64>,
}

/// A manifest entry chosen to represent its family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTarget {
    pub filename: String,
    pub family: String,
    pub chain: String,
    pub path: String,
    pub row_count: u64,
}

/// Profile of one representative file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileProfile {
    pub family: String,
    pub chain: String,
    pub filename: String,
    pub row_count: u64,
    pub source_path: String,
    /// One entry per column, in header order
    pub columns: Vec<ColumnSummary>,
}

impl FileProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A representative file that could not be profiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub family: String,
    pub filename: String,
    pub path: String,
    pub error: String,
}

/// Result of one profiling run over a snapshot directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataProfile {
    /// RFC 3339 timestamp in UTC with millisecond precision
    pub generated_at: String,
    pub source_directory: String,
    /// Snapshot date copied from the manifest
    pub dataset_date: String,
    /// Distinct families among `profiles`
    pub total_patterns: usize,
    pub profiles: Vec<FileProfile>,
    /// Families with no file of known row count
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_families: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<FailedFile>,
}

impl DataProfile {
    pub fn profile(&self, family: &str) -> Option<&FileProfile> {
        self.profiles.iter().find(|p| p.family == family)
    }
}

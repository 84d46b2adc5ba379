//! Per-column statistics and cell coercion.
//!
//! [`coerce_cell`] turns raw CSV text into a typed cell and
//! [`summarize_column`] reduces one column of cells to a [`ColumnSummary`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{CellValue, ColumnSummary, DataType};

/// Number of sample values kept per column.
pub const SAMPLE_SIZE: usize = 3;

/// Text that is stored verbatim even though it names a value.
const NULL_LITERAL: &str = "null";

static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("decimal pattern is valid")
});

/// Coerces raw cell text.
///
/// Empty text is null. Text that reads as a number becomes
/// [`CellValue::Number`], except the literal `null`; anything else stays
/// [`CellValue::Text`] unchanged.
///
/// Numeric reading is whitespace-tolerant and accepts decimal and exponent
/// forms, `0x`/`0o`/`0b` integers and `Infinity`. Whitespace-only text reads
/// as `0`.
pub fn coerce_cell(raw: &str) -> Option<CellValue> {
    if raw.is_empty() {
        return None;
    }
    if raw == NULL_LITERAL {
        return Some(CellValue::Text(raw.to_string()));
    }
    Some(match parse_number(raw) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(raw.to_string()),
    })
}

/// Whitespace and line terminators skipped around numeric text. Unlike
/// [`char::is_whitespace`] this includes U+FEFF and excludes U+0085.
fn is_number_padding(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim_matches(is_number_padding);
    if text.is_empty() {
        return Some(0.0);
    }

    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&text[2..], radix);
    }

    if DECIMAL_PATTERN.is_match(text) {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

fn is_null(cell: &Option<CellValue>) -> bool {
    match cell {
        None => true,
        Some(value) => value.is_empty_text(),
    }
}

/// Summarises one column.
///
/// `total_rows` is the declared row count of the file and is the denominator
/// of `null_rate`; it may differ from `values.len()`. A column is numeric only
/// when it has at least one non-null value and every non-null value is a
/// number. `min` and `max` are set for numeric columns only.
pub fn summarize_column(values: &[Option<CellValue>], name: &str, total_rows: u64) -> ColumnSummary {
    let non_null: Vec<&CellValue> = values
        .iter()
        .filter(|cell| !is_null(cell))
        .filter_map(Option::as_ref)
        .collect();
    let null_count = (values.len() - non_null.len()) as u64;

    let dtype = if !non_null.is_empty() && non_null.iter().all(|v| v.is_number()) {
        DataType::Numeric
    } else {
        DataType::String
    };

    let unique_count = non_null
        .iter()
        .map(|v| v.to_key())
        .collect::<HashSet<_>>()
        .len() as u64;

    let (min, max) = match dtype {
        DataType::Numeric => non_null
            .iter()
            .filter_map(|v| v.as_number())
            .fold((None, None), |(min, max): (Option<f64>, Option<f64>), n| {
                (
                    Some(min.map_or(n, |m| m.min(n))),
                    Some(max.map_or(n, |m| m.max(n))),
                )
            }),
        DataType::String => (None, None),
    };

    let null_rate = if total_rows > 0 {
        null_count as f64 / total_rows as f64
    } else {
        0.0
    };

    ColumnSummary {
        name: name.to_string(),
        dtype,
        null_count,
        null_rate,
        unique_count,
        sample_values: non_null.into_iter().take(SAMPLE_SIZE).cloned().collect(),
        min,
        max,
    }
}

//! Profiling of a single representative file.

use tracing::{debug, instrument};

use super::column::{coerce_cell, summarize_column};
use super::csv::parse_csv_with;
use super::types::{CellValue, FileProfile, FileTarget};
use super::ProfileOptions;
use crate::error::{FetchError, Result};
use crate::logging::truncate_field;
use crate::{log_column, log_file_op};

/// Reads and profiles the file behind `target`.
///
/// The recorded path is used as-is. Invalid UTF-8 is replaced rather than
/// rejected; an unreadable file is a [`FetchError::DataFile`].
#[instrument(skip_all, fields(family = %target.family, file = %target.filename))]
pub async fn profile_file(target: &FileTarget, options: &ProfileOptions) -> Result<FileProfile> {
    let bytes = tokio::fs::read(&target.path)
        .await
        .map_err(|e| FetchError::data_file(&target.path, e))?;
    log_file_op!(
        options.log,
        path = %target.path,
        bytes = bytes.len(),
        "Read data file"
    );

    let content = String::from_utf8_lossy(&bytes);
    Ok(profile_content(target, &content, options))
}

/// Profiles already-loaded CSV text for `target`.
///
/// Columns come from the parsed records, so content with a header but no
/// data rows yields a profile without columns. Every column summary uses the
/// target's declared row count for its null rate.
pub fn profile_content(target: &FileTarget, content: &str, options: &ProfileOptions) -> FileProfile {
    let table = parse_csv_with(content, &options.csv);

    let column_names: &[String] = if table.is_empty() {
        &[]
    } else {
        table.columns()
    };

    let columns = column_names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<Option<CellValue>> = table.column_values(index).map(coerce_cell).collect();
            let summary = summarize_column(&cells, name, target.row_count);
            log_column!(
                options.log,
                column = %name,
                dtype = %summary.dtype,
                nulls = summary.null_count,
                unique = summary.unique_count,
                samples = %truncate_field(
                    &summary
                        .sample_values
                        .iter()
                        .map(CellValue::to_key)
                        .collect::<Vec<_>>()
                        .join(", "),
                    options.log.max_field_length
                ),
                "Column summarized"
            );
            summary
        })
        .collect::<Vec<_>>();

    debug!(
        records = table.len(),
        columns = columns.len(),
        "File profiled"
    );

    FileProfile {
        family: target.family.clone(),
        chain: target.chain.clone(),
        filename: target.filename.clone(),
        row_count: target.row_count,
        source_path: target.path.clone(),
        columns,
    }
}

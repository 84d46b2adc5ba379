//! Property-based tests for classification, aggregation, selection and
//! column summaries.
//!
//! Each property generates inputs with proptest and checks an invariant that
//! must hold for every input rather than a single worked example.

use fetch_kaggle::inventory::analyze;
use fetch_kaggle::manifest::FileRecord;
use fetch_kaggle::pattern::{classify, UNKNOWN};
use fetch_kaggle::profile::csv::{parse_csv, parse_line};
use fetch_kaggle::profile::{select_representatives, summarize_column, CellValue};
use proptest::prelude::*;

fn record(filename: String, row_count: Option<u64>) -> FileRecord {
    FileRecord {
        path: format!("/snapshots/{filename}"),
        filename,
        size_bytes: 10,
        size_mb: 0.00001,
        sha256: "f".repeat(64),
        row_count,
    }
}

fn token() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,10}[a-z]"
}

fn date() -> impl Strategy<Value = String> {
    "[0-9]{8}"
}

fn filename() -> impl Strategy<Value = String> {
    prop_oneof![
        (token(), token(), date()).prop_map(|(t, c, d)| format!("{t}_file_{c}_{d}.csv")),
        "[a-zA-Z0-9_.]{0,24}",
    ]
}

fn cell() -> impl Strategy<Value = Option<CellValue>> {
    prop_oneof![
        Just(None),
        Just(Some(CellValue::Text(String::new()))),
        (-1e6f64..1e6).prop_map(|n| Some(CellValue::Number(n))),
        "[a-z]{1,5}".prop_map(|s| Some(CellValue::Text(s))),
    ]
}

proptest! {
    #[test]
    fn classification_is_deterministic(name in filename()) {
        prop_assert_eq!(classify(&name), classify(&name));
    }

    #[test]
    fn standard_names_round_trip(
        file_type in "[a-eg-z]{1,6}(_[a-eg-z]{1,6})?",
        chain in "[a-z]{1,8}",
        date in date(),
    ) {
        let info = classify(&format!("{file_type}_file_{chain}_{date}.csv"));
        prop_assert_eq!(info.file_type, file_type.clone());
        prop_assert_eq!(info.chain, chain.clone());
        prop_assert_eq!(info.pattern, format!("{file_type}_file_{chain}_YYYYMMDD.csv"));
    }

    #[test]
    fn nonstandard_names_are_unknown(name in "[a-z]{0,10}\\.txt") {
        let info = classify(&name);
        prop_assert_eq!(info.chain.as_str(), UNKNOWN);
        prop_assert_eq!(info.file_type.as_str(), UNKNOWN);
        prop_assert_eq!(info.pattern, name);
    }

    #[test]
    fn aggregation_conserves_files(
        files in prop::collection::vec((filename(), prop::option::of(0u64..10_000)), 0..40)
    ) {
        let records: Vec<_> = files.into_iter().map(|(f, r)| record(f, r)).collect();
        let analysis = analyze(&records);

        let grouped: usize = analysis.patterns.iter().map(|g| g.files.len()).sum();
        prop_assert_eq!(grouped, records.len());
        prop_assert_eq!(analysis.summary.total_files, records.len() as u64);
        prop_assert_eq!(analysis.chains.values().sum::<u64>(), records.len() as u64);
        prop_assert_eq!(analysis.file_types.values().sum::<u64>(), records.len() as u64);

        let expected_rows: u64 = records.iter().filter_map(|r| r.row_count).sum();
        prop_assert_eq!(analysis.summary.total_rows, expected_rows);
    }

    #[test]
    fn null_rate_is_bounded(
        cells in prop::collection::vec(cell(), 0..50),
        extra in 0u64..20,
    ) {
        let total = cells.len() as u64 + extra;
        let summary = summarize_column(&cells, "c", total);
        prop_assert!(summary.null_count <= total);
        prop_assert!((0.0..=1.0).contains(&summary.null_rate));
        prop_assert!(summary.sample_values.len() <= 3);
        prop_assert!(summary.unique_count <= cells.len() as u64 - summary.null_count);
    }

    #[test]
    fn selection_picks_family_maximum(
        counts in prop::collection::vec(prop::option::of(0u64..1_000), 1..20)
    ) {
        let records: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, rows)| record(format!("price_file_chain{i}_20240101.csv"), *rows))
            .collect();
        let selection = select_representatives(&records);

        match counts.iter().flatten().max() {
            Some(max) => {
                prop_assert_eq!(selection.targets.len(), 1);
                prop_assert_eq!(selection.targets[0].row_count, *max);
                prop_assert!(selection.skipped_families.is_empty());
            }
            None => {
                prop_assert!(selection.targets.is_empty());
                prop_assert_eq!(selection.skipped_families, vec!["price".to_string()]);
            }
        }
    }

    #[test]
    fn unquoted_lines_split_on_every_comma(fields in prop::collection::vec("[a-z0-9 ]{0,6}", 1..10)) {
        let line = fields.join(",");
        prop_assert_eq!(parse_line(&line), fields);
    }

    #[test]
    fn records_always_have_every_column(
        width in 1usize..6,
        rows in prop::collection::vec(prop::collection::vec("[a-z0-9]{1,4}", 0..8), 0..10),
    ) {
        let header: Vec<String> = (0..width).map(|i| format!("col{i}")).collect();
        let mut content = header.join(",");
        for row in &rows {
            content.push('\n');
            content.push_str(&row.join(","));
        }

        let table = parse_csv(&content);
        prop_assert_eq!(table.columns(), header.as_slice());
        for record in table.records() {
            prop_assert_eq!(record.iter().count(), width);
        }
    }
}

//! A small, lenient CSV reader for mostly well-formed exports.
//!
//! The first non-blank line is the header. Every later non-blank line becomes
//! one record keyed by header name. Rows are never rejected: missing trailing
//! fields read as `""` and surplus fields are ignored. Quotes toggle quoted
//! mode and a doubled quote inside a quoted field yields a literal `"`.
//!
//! Lines are split on `\n` only, so a quoted field cannot span lines.
//!
//! # Example
//!
//! ```rust
//! use fetch_kaggle::profile::csv::parse_csv;
//!
//! let table = parse_csv("name,price\n\"Milk, 1L\",5.90\nBread\n");
//! assert_eq!(table.columns(), ["name", "price"]);
//! assert_eq!(table.len(), 2);
//!
//! let second = table.record(1).unwrap();
//! assert_eq!(second.get("name"), Some("Bread"));
//! assert_eq!(second.get("price"), Some(""));
//! ```

/// Parser options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Strip one trailing `\r` from every physical line before parsing
    pub trim_carriage_returns: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            trim_carriage_returns: true,
        }
    }
}

impl CsvOptions {
    /// Options that keep a trailing `\r` inside the last field of a line.
    pub fn raw() -> Self {
        Self {
            trim_carriage_returns: false,
        }
    }
}

/// Parsed CSV content: named columns plus one value row per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Record keys in header order.
    ///
    /// Empty header names are skipped and a repeated name keeps its first
    /// position while reading the value of its last occurrence.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<CsvRecord<'_>> {
        self.rows.get(index).map(|values| CsvRecord {
            columns: &self.columns,
            values,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> + '_ {
        self.rows.iter().map(|values| CsvRecord {
            columns: &self.columns,
            values,
        })
    }

    /// All values of the column at `index`, one per record.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }
}

/// A borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> CsvRecord<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Parses CSV text with default options.
pub fn parse_csv(content: &str) -> CsvTable {
    parse_csv_with(content, &CsvOptions::default())
}

/// Parses CSV text.
pub fn parse_csv_with(content: &str, options: &CsvOptions) -> CsvTable {
    let mut lines = content
        .split('\n')
        .map(|line| {
            if options.trim_carriage_returns {
                line.strip_suffix('\r').unwrap_or(line)
            } else {
                line
            }
        })
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return CsvTable::default();
    };

    // (name, field index) for each distinct non-empty header
    let mut layout: Vec<(String, usize)> = Vec::new();
    for (index, name) in parse_line(header_line).into_iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        match layout.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = index,
            None => layout.push((name, index)),
        }
    }

    let rows = lines
        .map(|line| {
            let fields = parse_line(line);
            layout
                .iter()
                .map(|(_, index)| fields.get(*index).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    CsvTable {
        columns: layout.into_iter().map(|(name, _)| name).collect(),
        rows,
    }
}

/// Splits one line into fields.
///
/// Always yields at least one field; an empty line yields `[""]`.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_plain() {
        assert_eq!(parse_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_line(""), vec![""]);
        assert_eq!(parse_line("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn test_parse_line_quotes() {
        assert_eq!(parse_line(r#""a,b",c"#), vec!["a,b", "c"]);
        assert_eq!(parse_line(r#""say ""hi""",x"#), vec![r#"say "hi""#, "x"]);
        // quotes toggle mid-field as well
        assert_eq!(parse_line(r#"ab"c,d"e,f"#), vec!["abc,de", "f"]);
        // doubled quote outside quoted mode opens and closes an empty section
        assert_eq!(parse_line(r#"a""b"#), vec!["ab"]);
    }

    #[test]
    fn test_unterminated_quote_consumes_rest() {
        assert_eq!(parse_line(r#""open,still open"#), vec!["open,still open"]);
    }

    #[test]
    fn test_header_and_records() {
        let table = parse_csv("id,name\n1,Milk\n2,Bread\n");
        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.len(), 2);

        let first = table.record(0).unwrap();
        assert_eq!(first.get("id"), Some("1"));
        assert_eq!(first.get("name"), Some("Milk"));
        assert_eq!(first.get("missing"), None);
    }

    #[test]
    fn test_short_and_long_rows() {
        let table = parse_csv("a,b,c\n1\n1,2,3,4\n");
        let short: Vec<_> = table.record(0).unwrap().iter().collect();
        assert_eq!(short, vec![("a", "1"), ("b", ""), ("c", "")]);
        let long: Vec<_> = table.record(1).unwrap().iter().map(|(_, v)| v).collect();
        assert_eq!(long, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let table = parse_csv("\n  \nid\n\n1\n   \n2");
        assert_eq!(table.columns(), ["id"]);
        assert_eq!(table.column_values(0).collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("").columns().is_empty());

        let header_only = parse_csv("a,b\n");
        assert!(header_only.is_empty());
        assert_eq!(header_only.columns(), ["a", "b"]);
    }

    #[test]
    fn test_empty_header_names_are_skipped() {
        let table = parse_csv("a,,c\n1,2,3\n");
        assert_eq!(table.columns(), ["a", "c"]);
        assert_eq!(table.record(0).unwrap().get("c"), Some("3"));
    }

    #[test]
    fn test_duplicate_header_reads_last_value() {
        let table = parse_csv("a,b,a\n1,2,3\n");
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.record(0).unwrap().get("a"), Some("3"));
    }

    #[test]
    fn test_crlf_trimmed_by_default() {
        let table = parse_csv("name,city\r\nMilk,Haifa\r\n");
        assert_eq!(table.columns(), ["name", "city"]);
        assert_eq!(table.record(0).unwrap().get("city"), Some("Haifa"));
    }

    #[test]
    fn test_crlf_kept_in_raw_mode() {
        let table = parse_csv_with("name,city\r\nMilk,Haifa\r\n", &CsvOptions::raw());
        assert_eq!(table.columns(), ["name", "city\r"]);
        assert_eq!(table.record(0).unwrap().get("city\r"), Some("Haifa\r"));
    }

    #[test]
    fn test_quoted_field_with_escaped_quotes_in_table() {
        let table = parse_csv("desc,qty\n\"12\"\" pipe, steel\",4\n");
        let record = table.record(0).unwrap();
        assert_eq!(record.get("desc"), Some("12\" pipe, steel"));
        assert_eq!(record.get("qty"), Some("4"));
    }
}

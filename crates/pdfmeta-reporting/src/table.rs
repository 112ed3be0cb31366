//! Aggregation of per-file results into one table with a unified column set.

use indexmap::IndexSet;

use pdfmeta_core::ExtractionResult;

pub const FILENAME_COLUMN: &str = "filename";
pub const ERROR_COLUMN: &str = "error";
pub const TEXT_COLUMN: &str = "text";
/// Replaces any metadata key mentioning XML; the packet itself is too large
/// and too structured for a spreadsheet cell.
pub const XML_FLAG_COLUMN: &str = "Contains_XML_Metadata";

/// Rows sharing one column set: `filename`, the union of metadata columns in
/// first-seen order, then `error` (only if some file failed) and `text` (only
/// if requested).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTable {
    metadata_columns: Vec<String>,
    has_error_column: bool,
    has_text_column: bool,
    rows: Vec<Vec<String>>,
}

impl MetadataTable {
    /// The full header row.
    pub fn header(&self) -> Vec<&str> {
        let mut header = Vec::with_capacity(self.width());
        header.push(FILENAME_COLUMN);
        header.extend(self.metadata_columns.iter().map(String::as_str));
        if self.has_error_column {
            header.push(ERROR_COLUMN);
        }
        if self.has_text_column {
            header.push(TEXT_COLUMN);
        }
        header
    }

    /// Unified metadata columns, without `filename`/`error`/`text`.
    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    /// Data rows, each exactly as wide as [`header`](Self::header).
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        1 + self.metadata_columns.len()
            + usize::from(self.has_error_column)
            + usize::from(self.has_text_column)
    }
}

/// Column and cell value a metadata entry maps to.
fn cell<'a>(key: &'a str, value: &'a str) -> (&'a str, &'a str) {
    if key.contains("XML") {
        (XML_FLAG_COLUMN, "Yes")
    } else {
        (key, value)
    }
}

/// Build the export table for a batch.
///
/// Keys are unioned exactly as written (case-sensitive). Failed files still
/// get a row: their metadata cells stay blank and the failure goes in the
/// `error` column.
pub fn build_table(results: &[ExtractionResult], include_text: bool) -> MetadataTable {
    let mut columns: IndexSet<String> = IndexSet::new();
    for result in results.iter().filter(|r| r.is_ok()) {
        for (key, value) in &result.metadata {
            let (column, _) = cell(key, value);
            if !columns.contains(column) {
                columns.insert(column.to_string());
            }
        }
    }

    let has_error_column = results.iter().any(|r| !r.is_ok());

    let rows = results
        .iter()
        .map(|result| {
            let mut values = vec![String::new(); columns.len()];
            if result.is_ok() {
                for (key, value) in &result.metadata {
                    let (column, value) = cell(key, value);
                    if let Some(index) = columns.get_index_of(column) {
                        values[index] = value.to_string();
                    }
                }
            }

            let mut row = Vec::with_capacity(values.len() + 3);
            row.push(result.filename.clone());
            row.extend(values);
            if has_error_column {
                row.push(result.error.clone().unwrap_or_default());
            }
            if include_text {
                let text = if result.is_ok() { result.text.as_str() } else { "" };
                row.push(text.to_string());
            }
            row
        })
        .collect();

    MetadataTable {
        metadata_columns: columns.into_iter().collect(),
        has_error_column,
        has_text_column: include_text,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmeta_core::{Metadata, XMP_METADATA_KEY};

    fn ok(name: &str, pairs: &[(&str, &str)], text: &str) -> ExtractionResult {
        let mut r = ExtractionResult::failed(name, "");
        r.error = None;
        r.metadata = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Metadata>();
        r.text = text.to_string();
        r
    }

    #[test]
    fn empty_batch_has_only_filename() {
        let table = build_table(&[], false);
        assert_eq!(table.header(), vec!["filename"]);
        assert!(table.is_empty());

        let with_text = build_table(&[], true);
        assert_eq!(with_text.header(), vec!["filename", "text"]);
        assert_eq!(with_text.len(), 0);
    }

    #[test]
    fn union_is_first_seen_order_with_blanks() {
        let results = vec![
            ok("one.pdf", &[("A", "a1"), ("B", "b1")], ""),
            ok("two.pdf", &[("B", "b2"), ("C", "c2")], ""),
        ];
        let table = build_table(&results, false);
        assert_eq!(table.header(), vec!["filename", "A", "B", "C"]);
        assert_eq!(table.rows()[0], vec!["one.pdf", "a1", "b1", ""]);
        assert_eq!(table.rows()[1], vec!["two.pdf", "", "b2", "c2"]);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let results = vec![
            ok("one.pdf", &[("Title", "x")], ""),
            ok("two.pdf", &[("title", "y")], ""),
        ];
        let table = build_table(&results, false);
        assert_eq!(table.metadata_columns(), &["Title", "title"]);
    }

    #[test]
    fn failed_files_get_a_row_and_error_column() {
        let results = vec![
            ok("good.pdf", &[("Title", "T")], "body"),
            ExtractionResult::failed("bad.pdf", "malformed PDF: no xref"),
        ];
        let table = build_table(&results, true);
        assert_eq!(table.len(), 2);
        assert_eq!(table.header(), vec!["filename", "Title", "error", "text"]);
        assert_eq!(table.rows()[0], vec!["good.pdf", "T", "", "body"]);
        assert_eq!(
            table.rows()[1],
            vec!["bad.pdf", "", "malformed PDF: no xref", ""]
        );
    }

    #[test]
    fn no_error_column_when_everything_succeeded() {
        let table = build_table(&[ok("a.pdf", &[("A", "1")], "")], false);
        assert!(!table.header().contains(&ERROR_COLUMN));
    }

    #[test]
    fn errored_result_metadata_is_ignored() {
        let mut bad = ok("bad.pdf", &[("Leaked", "x")], "text");
        bad.error = Some("boom".into());
        let table = build_table(&[bad], true);
        assert_eq!(table.header(), vec!["filename", "error", "text"]);
        assert_eq!(table.rows()[0], vec!["bad.pdf", "boom", ""]);
    }

    #[test]
    fn xml_keys_collapse_into_flag_column() {
        let results = vec![
            ok(
                "xmp.pdf",
                &[(XMP_METADATA_KEY, "<x:xmpmeta/>"), ("Title", "T")],
                "",
            ),
            ok("plain.pdf", &[("Title", "U")], ""),
        ];
        let table = build_table(&results, false);
        assert_eq!(
            table.header(),
            vec!["filename", XML_FLAG_COLUMN, "Title"]
        );
        assert_eq!(table.rows()[0], vec!["xmp.pdf", "Yes", "T"]);
        assert_eq!(table.rows()[1], vec!["plain.pdf", "", "U"]);
    }

    #[test]
    fn rows_match_header_width() {
        let results = vec![
            ok("a.pdf", &[("A", "1")], "t"),
            ExtractionResult::failed("b.pdf", "e"),
            ok("c.pdf", &[("B", "2"), ("C", "3")], "u"),
        ];
        let table = build_table(&results, true);
        assert_eq!(table.width(), table.header().len());
        assert!(table.rows().iter().all(|r| r.len() == table.width()));
        assert_eq!(table.len(), results.len());
    }
}

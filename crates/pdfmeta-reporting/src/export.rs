use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use pdfmeta_core::{ExtractionResult, Metadata, MetadataSource};

use crate::ExportError;
use crate::table::{MetadataTable, build_table};

/// Output format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}' (expected csv or json)", other)),
        }
    }
}

/// Serialize a table as RFC 4180 CSV: header row first, CRLF line endings,
/// fields with commas, quotes or line breaks double-quoted.
pub fn serialize_csv(table: &MetadataTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(table.header())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Build the table for `results` and serialize it as CSV.
pub fn export_csv(results: &[ExtractionResult], include_text: bool) -> Result<Vec<u8>, ExportError> {
    serialize_csv(&build_table(results, include_text))
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    filename: &'a str,
    metadata: &'a Metadata,
    sources: &'a [MetadataSource],
    page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Pretty-printed JSON array, one object per file. Unlike CSV the XMP packet
/// is kept verbatim.
pub fn export_json(results: &[ExtractionResult], include_text: bool) -> Result<Vec<u8>, ExportError> {
    let records: Vec<JsonRecord<'_>> = results
        .iter()
        .map(|r| JsonRecord {
            filename: &r.filename,
            metadata: &r.metadata,
            sources: &r.sources,
            page_count: r.page_count,
            error: r.error.as_deref(),
            text: include_text.then_some(r.text.as_str()),
        })
        .collect();
    let mut out = serde_json::to_vec_pretty(&records)?;
    out.push(b'\n');
    Ok(out)
}

pub fn export(
    results: &[ExtractionResult],
    include_text: bool,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => export_csv(results, include_text),
        ExportFormat::Json => export_json(results, include_text),
    }
}

/// Export results to the given path.
pub fn write_export(
    results: &[ExtractionResult],
    include_text: bool,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = export(results, include_text, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(&content)?;
    Ok(())
}

/// Download name for an export taken at `now`, e.g.
/// `pdf_metadata_export_20240131_235959.csv`.
pub fn export_filename(now: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "pdf_metadata_export_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

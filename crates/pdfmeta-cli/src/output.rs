use std::io::Write;

use owo_colors::OwoColorize;
use pdfmeta_core::ExtractionResult;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print everything known about one file: header line, metadata fields,
/// warnings, and optionally the extracted text.
pub fn print_file_report(
    w: &mut dyn Write,
    result: &ExtractionResult,
    show_text: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", result.filename.bold())?;
    } else {
        writeln!(w, "{}", result.filename)?;
    }

    if let Some(ref error) = result.error {
        if color.enabled() {
            writeln!(w, "  {} {}", "ERROR:".red(), error)?;
        } else {
            writeln!(w, "  ERROR: {}", error)?;
        }
        writeln!(w)?;
        return Ok(());
    }

    let sources: Vec<&str> = result.sources.iter().map(|s| s.as_str()).collect();
    let sources = if sources.is_empty() {
        "none".to_string()
    } else {
        sources.join(", ")
    };
    let summary = format!("{} page(s), metadata sources: {}", result.page_count, sources);
    if color.enabled() {
        writeln!(w, "  {}", summary.dimmed())?;
    } else {
        writeln!(w, "  {}", summary)?;
    }

    if result.has_no_metadata() {
        if color.enabled() {
            writeln!(w, "  {}", "No metadata found in this PDF.".yellow())?;
        } else {
            writeln!(w, "  No metadata found in this PDF.")?;
        }
    }

    for (key, value) in &result.metadata {
        let value = indent_continuation(value, 4);
        if color.enabled() {
            writeln!(w, "  {}: {}", key.cyan(), value)?;
        } else {
            writeln!(w, "  {}: {}", key, value)?;
        }
    }

    if show_text {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "  {}", "Text:".bold())?;
        } else {
            writeln!(w, "  Text:")?;
        }
        if result.text.trim().is_empty() {
            writeln!(w, "    (no text)")?;
        } else {
            for line in result.text.lines() {
                writeln!(w, "    {}", line)?;
            }
        }
    }

    writeln!(w)?;
    Ok(())
}

/// One-line summary after a batch: how many files, how many failed.
pub fn print_batch_summary(
    w: &mut dyn Write,
    results: &[ExtractionResult],
    color: ColorMode,
) -> std::io::Result<()> {
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    let ok = results.len() - failed;
    if color.enabled() {
        let failed_str = format!("{} failed", failed);
        let failed_str = if failed > 0 {
            failed_str.red().to_string()
        } else {
            failed_str.dimmed().to_string()
        };
        writeln!(
            w,
            "{} files: {}, {}",
            results.len(),
            format!("{} extracted", ok).green(),
            failed_str
        )
    } else {
        writeln!(w, "{} files: {} extracted, {} failed", results.len(), ok, failed)
    }
}

/// Multi-line values (XMP packets, long subjects) keep their shape under
/// the `key: ` prefix.
fn indent_continuation(value: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    value.lines().collect::<Vec<_>>().join(&format!("\n{}", pad))
}

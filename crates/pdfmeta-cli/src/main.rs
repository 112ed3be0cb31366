use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfmeta_core::UploadedFile;
use pdfmeta_core::config_file::ConfigFile;
use pdfmeta_pdf_lopdf::LopdfBackend;
use pdfmeta_reporting::ExportFormat;

mod output;

use output::ColorMode;

/// PDF Extractor - Pull document metadata and text out of PDF files
#[derive(Parser, Debug)]
#[command(name = "pdfmeta", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print metadata (and optionally text) for each PDF
    Show {
        /// PDF files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also print the extracted text
        #[arg(long)]
        text: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Skip the XMP metadata packet
        #[arg(long)]
        no_xmp: bool,
    },

    /// Export metadata for a batch of PDFs as one CSV (or JSON) table
    Export {
        /// PDF files to export, one row each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Add a trailing `text` column with the extracted text
        #[arg(long)]
        include_text: bool,

        /// Output format: csv or json
        #[arg(long)]
        format: Option<String>,

        /// Write the export to this file (default: stdout)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write a timestamped export file into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip the XMP metadata packet
        #[arg(long)]
        no_xmp: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = pdfmeta_core::config_file::load_config();

    match cli.command {
        Command::Show {
            files,
            text,
            no_color,
            no_xmp,
        } => show(&files, text, no_color, no_xmp, &config),
        Command::Export {
            files,
            include_text,
            format,
            output,
            output_dir,
            no_xmp,
        } => {
            let settings = ExportSettings::resolve(include_text, format.as_deref(), no_xmp, &config)?;
            let target = match (output, output_dir) {
                (Some(path), _) => OutputTarget::File(path),
                (None, Some(dir)) => OutputTarget::Dir(dir),
                (None, None) => OutputTarget::Stdout,
            };
            export(&files, &settings, target)
        }
    }
}

/// Export options after resolution: CLI flags > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExportSettings {
    include_text: bool,
    format: ExportFormat,
    include_xmp: bool,
}

impl ExportSettings {
    fn resolve(
        include_text: bool,
        format: Option<&str>,
        no_xmp: bool,
        config: &ConfigFile,
    ) -> anyhow::Result<Self> {
        let export = config.export.clone().unwrap_or_default();
        let format = match format.or(export.format.as_deref()) {
            Some(f) => f.parse::<ExportFormat>().map_err(anyhow::Error::msg)?,
            None => ExportFormat::default(),
        };
        Ok(Self {
            include_text: include_text || export.include_text.unwrap_or(false),
            format,
            include_xmp: resolve_include_xmp(no_xmp, config),
        })
    }
}

fn resolve_include_xmp(no_xmp: bool, config: &ConfigFile) -> bool {
    !no_xmp
        && config
            .extraction
            .as_ref()
            .and_then(|e| e.include_xmp)
            .unwrap_or(true)
}

#[derive(Debug)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
    Dir(PathBuf),
}

/// Read every input path. A missing or unreadable file is an I/O error for
/// the whole run; content problems are reported per file later.
fn read_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|path| {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(UploadedFile::new(display_name(path), bytes))
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn show(
    paths: &[PathBuf],
    show_text: bool,
    no_color: bool,
    no_xmp: bool,
    config: &ConfigFile,
) -> anyhow::Result<()> {
    let files = read_inputs(paths)?;
    let backend = LopdfBackend::new().with_xmp(resolve_include_xmp(no_xmp, config));
    let color = ColorMode(!no_color);

    let results = pdfmeta_ingest::extract_all(&files, &backend);

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    for result in &results {
        output::print_file_report(&mut writer, result, show_text, color)?;
    }
    if results.len() > 1 {
        output::print_batch_summary(&mut writer, &results, color)?;
    }
    Ok(())
}

fn export(paths: &[PathBuf], settings: &ExportSettings, target: OutputTarget) -> anyhow::Result<()> {
    let files = read_inputs(paths)?;
    let backend = LopdfBackend::new().with_xmp(settings.include_xmp);

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let results = pdfmeta_ingest::extract_all_with_progress(&files, &backend, |_, result| {
        if let Some(ref error) = result.error {
            bar.println(format!("{}: {}", result.filename, error));
        }
        bar.set_message(result.filename.clone());
        bar.inc(1);
    });
    bar.finish_and_clear();

    let destination = match target {
        OutputTarget::Stdout => {
            let content =
                pdfmeta_reporting::export(&results, settings.include_text, settings.format)?;
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            writer.write_all(&content)?;
            writer.flush()?;
            None
        }
        OutputTarget::File(path) => Some(path),
        OutputTarget::Dir(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let name = pdfmeta_reporting::export_filename(
                chrono::Local::now().naive_local(),
                settings.format,
            );
            Some(dir.join(name))
        }
    };

    if let Some(path) = destination {
        pdfmeta_reporting::write_export(&results, settings.include_text, settings.format, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let mut stderr = std::io::stderr();
        output::print_batch_summary(&mut stderr, &results, ColorMode(false))?;
        writeln!(stderr, "Exported to {}", path.display())?;
        tracing::info!(path = %path.display(), files = results.len(), "export written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pdfmeta_core::config_file::{ExportConfig, ExtractionConfig};
    use pdfmeta_pdf_lopdf::fixtures::PdfFixture;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_and_output_dir_conflict() {
        let parsed = Cli::try_parse_from([
            "pdfmeta", "export", "a.pdf", "--output", "x.csv", "--output-dir", "out",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["pdfmeta", "show"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let config = ConfigFile {
            extraction: Some(ExtractionConfig {
                include_xmp: Some(true),
            }),
            export: Some(ExportConfig {
                include_text: Some(true),
                format: Some("json".to_string()),
            }),
            ..Default::default()
        };

        let from_file = ExportSettings::resolve(false, None, false, &config).unwrap();
        assert_eq!(
            from_file,
            ExportSettings {
                include_text: true,
                format: ExportFormat::Json,
                include_xmp: true,
            }
        );

        let from_flags = ExportSettings::resolve(false, Some("csv"), true, &config).unwrap();
        assert_eq!(from_flags.format, ExportFormat::Csv);
        assert!(!from_flags.include_xmp);
    }

    #[test]
    fn defaults_without_config() {
        let settings = ExportSettings::resolve(false, None, false, &ConfigFile::default()).unwrap();
        assert_eq!(
            settings,
            ExportSettings {
                include_text: false,
                format: ExportFormat::Csv,
                include_xmp: true,
            }
        );
        assert!(ExportSettings::resolve(false, Some("xlsx"), false, &ConfigFile::default()).is_err());
    }

    #[test]
    fn export_to_file_keeps_one_row_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&good, PdfFixture::new().info("Title", "Hi").page("Body").build()).unwrap();
        std::fs::write(&bad, b"not a pdf at all").unwrap();

        let out = dir.path().join("export.csv");
        let settings = ExportSettings::resolve(false, None, false, &ConfigFile::default()).unwrap();
        export(&[good, bad], &settings, OutputTarget::File(out.clone())).unwrap();

        let csv = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines[0], "filename,Title,error");
        assert_eq!(lines[1], "good.pdf,Hi,");
        assert_eq!(lines[2], "bad.pdf,,not a PDF: missing %PDF- header");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn export_to_dir_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.pdf");
        std::fs::write(&input, PdfFixture::new().page("x").build()).unwrap();
        let out_dir = dir.path().join("exports");

        let settings = ExportSettings::resolve(false, Some("json"), false, &ConfigFile::default())
            .unwrap();
        export(&[input], &settings, OutputTarget::Dir(out_dir.clone())).unwrap();

        let names: Vec<String> = std::fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("pdf_metadata_export_"));
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.pdf");
        assert!(read_inputs(&[missing]).is_err());
    }
}

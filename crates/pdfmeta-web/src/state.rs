use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use pdfmeta_core::PdfBackend;
use pdfmeta_core::config_file::ConfigFile;
use pdfmeta_reporting::ExportFormat;

const DEFAULT_BIND: &str = "0.0.0.0:8501";
const DEFAULT_MAX_UPLOAD_MB: u32 = 200;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub backend: Arc<dyn PdfBackend>,
    pub settings: Settings,
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: SocketAddr,
    /// Normalized mount prefix: empty, or `/segment[/segment…]` without a
    /// trailing slash.
    pub base_path: String,
    pub max_upload_mb: u32,
    pub include_xmp: bool,
    /// Initial state of the "Include text" checkbox.
    pub include_text: bool,
    /// Format used when an export request does not name one.
    pub export_format: ExportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8501)),
            base_path: String::new(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            include_xmp: true,
            include_text: false,
            export_format: ExportFormat::Csv,
        }
    }
}

impl Settings {
    /// Resolve configuration: env vars > config file > defaults.
    ///
    /// `env` looks up a variable by name; main passes `std::env::var`.
    pub fn resolve(
        config: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let server = config.server.clone().unwrap_or_default();

        let bind_str = env("PDFMETA_BIND")
            .or(server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .with_context(|| format!("invalid bind address '{}'", bind_str))?;

        let base_path = env("PDFMETA_BASE_PATH")
            .or(server.base_path)
            .unwrap_or_default();

        let max_upload_mb = match env("PDFMETA_MAX_UPLOAD_MB") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid PDFMETA_MAX_UPLOAD_MB '{}'", v))?,
            None => server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
        };

        let include_xmp = config
            .extraction
            .as_ref()
            .and_then(|e| e.include_xmp)
            .unwrap_or(true);
        let export = config.export.clone().unwrap_or_default();
        let include_text = export.include_text.unwrap_or(false);
        let export_format = match export.format {
            Some(f) => f.parse::<ExportFormat>().map_err(anyhow::Error::msg)?,
            None => ExportFormat::default(),
        };

        Ok(Self {
            bind,
            base_path: normalize_base_path(&base_path).map_err(anyhow::Error::msg)?,
            max_upload_mb,
            include_xmp,
            include_text,
            export_format,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

/// `"pdf/"`, `"/pdf"` and `" /pdf/ "` all become `"/pdf"`; `"/"` becomes `""`.
///
/// Segments may only hold unreserved URL characters (`A-Z a-z 0-9 - . _ ~`);
/// the prefix is both a route and a literal in the rendered page.
pub fn normalize_base_path(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let valid = trimmed.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
    });
    if !valid {
        return Err(format!("invalid base path '{}'", raw));
    }
    Ok(format!("/{}", trimmed))
}

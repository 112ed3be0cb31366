use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:8501`.
    pub bind: Option<String>,
    /// Path prefix the app is mounted under, e.g. `/pdf`.
    pub base_path: Option<String>,
    pub max_upload_mb: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Read the catalog's XMP packet in addition to the Info dictionary.
    pub include_xmp: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub include_text: Option<bool>,
    /// `csv` or `json`.
    pub format: Option<String>,
}

/// Platform config directory path: `<config_dir>/pdfmeta/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfmeta").join("config.toml"))
}

/// Load config by cascading CWD `.pdfmeta.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfmeta.toml"));
    cascade(platform, cwd)
}

fn cascade(platform: Option<ConfigFile>, cwd: Option<ConfigFile>) -> ConfigFile {
    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_server = base.server.unwrap_or_default();
    let base_extraction = base.extraction.unwrap_or_default();
    let base_export = base.export.unwrap_or_default();
    let server = overlay.server.unwrap_or_default();
    let extraction = overlay.extraction.unwrap_or_default();
    let export = overlay.export.unwrap_or_default();

    ConfigFile {
        server: Some(ServerConfig {
            bind: server.bind.or(base_server.bind),
            base_path: server.base_path.or(base_server.base_path),
            max_upload_mb: server.max_upload_mb.or(base_server.max_upload_mb),
        }),
        extraction: Some(ExtractionConfig {
            include_xmp: extraction.include_xmp.or(base_extraction.include_xmp),
        }),
        export: Some(ExportConfig {
            include_text: export.include_text.or(base_export.include_text),
            format: export.format.or(base_export.format),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_section_round_trip_toml() {
        let config = ConfigFile {
            server: Some(ServerConfig {
                base_path: Some("/pdf".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.unwrap().base_path.unwrap(), "/pdf");
    }

    #[test]
    fn absent_keys_deserialize_as_none() {
        let toml_str = "[export]\ninclude_text = true\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let export = parsed.export.unwrap();
        assert_eq!(export.include_text, Some(true));
        assert!(export.format.is_none());
        assert!(parsed.server.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:9000".to_string()),
                max_upload_mb: Some(50),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            server: Some(ServerConfig {
                bind: Some("0.0.0.0:8080".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).server.unwrap();
        assert_eq!(merged.bind.unwrap(), "0.0.0.0:8080");
        assert_eq!(merged.max_upload_mb, Some(50));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            extraction: Some(ExtractionConfig {
                include_xmp: Some(false),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.extraction.unwrap().include_xmp, Some(false));
    }

    #[test]
    fn cascade_prefers_cwd_file() {
        let platform = ConfigFile {
            export: Some(ExportConfig {
                include_text: Some(false),
                format: Some("json".to_string()),
            }),
            ..Default::default()
        };
        let cwd = ConfigFile {
            export: Some(ExportConfig {
                include_text: Some(true),
                format: None,
            }),
            ..Default::default()
        };
        let export = cascade(Some(platform), Some(cwd)).export.unwrap();
        assert_eq!(export.include_text, Some(true));
        assert_eq!(export.format.as_deref(), Some("json"));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nmax_upload_mb = 25\n\n[extraction]\ninclude_xmp = false\n",
        )
        .unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.server.unwrap().max_upload_mb, Some(25));
        assert_eq!(loaded.extraction.unwrap().include_xmp, Some(false));
    }

    #[test]
    fn load_from_path_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}

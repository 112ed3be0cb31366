use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfContent};

/// Document-level key/value properties, in the order they were read.
///
/// Keys are not fixed: whatever the document's information dictionary holds
/// ends up here. Keys are compared exactly (case-sensitive).
pub type Metadata = IndexMap<String, String>;

/// Key under which the raw XMP packet is stored in [`Metadata`].
pub const XMP_METADATA_KEY: &str = "XML Metadata";

/// A named byte buffer handed over by the hosting layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Where a metadata entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// The trailer's `/Info` document information dictionary.
    Info,
    /// The catalog's `/Metadata` XML stream.
    Xmp,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSource::Info => "Info",
            MetadataSource::Xmp => "XMP",
        }
    }
}

/// Outcome of processing one [`UploadedFile`].
///
/// When `error` is set, extraction failed for this file and every other
/// field except `filename` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub sources: Vec<MetadataSource>,
    #[serde(default)]
    pub page_count: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// A successful result built from a backend's output.
    pub fn from_content(filename: impl Into<String>, content: PdfContent) -> Self {
        Self {
            filename: filename.into(),
            metadata: content.metadata,
            sources: content.sources,
            page_count: content.page_count,
            text: content.text,
            error: None,
        }
    }

    /// A failed result carrying only the filename and a short description.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            metadata: Metadata::new(),
            sources: Vec::new(),
            page_count: 0,
            text: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// True for a parsed document that carried no metadata at all.
    pub fn has_no_metadata(&self) -> bool {
        self.is_ok() && self.metadata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_is_empty_apart_from_name_and_error() {
        let r = ExtractionResult::failed("broken.pdf", "not a PDF");
        assert_eq!(r.filename, "broken.pdf");
        assert_eq!(r.error.as_deref(), Some("not a PDF"));
        assert!(r.metadata.is_empty());
        assert!(r.text.is_empty());
        assert!(!r.is_ok());
        assert!(!r.has_no_metadata());
    }

    #[test]
    fn from_content_keeps_metadata_order() {
        let mut metadata = Metadata::new();
        metadata.insert("Title".into(), "Test".into());
        metadata.insert("Author".into(), "Alice".into());
        let content = PdfContent {
            metadata,
            sources: vec![MetadataSource::Info],
            page_count: 1,
            text: "Hello".into(),
        };
        let r = ExtractionResult::from_content("a.pdf", content);
        let keys: Vec<&str> = r.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Title", "Author"]);
        assert!(r.is_ok());
    }

    #[test]
    fn json_round_trip_preserves_key_order() {
        let mut r = ExtractionResult::failed("x.pdf", "boom");
        r.error = None;
        r.metadata.insert("Zeta".into(), "1".into());
        r.metadata.insert("Alpha".into(), "2".into());
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("\"error\""));
        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
        assert_eq!(back, r);
    }

    #[test]
    fn json_missing_fields_default() {
        let back: ExtractionResult =
            serde_json::from_str(r#"{"filename":"only-name.pdf"}"#).unwrap();
        assert_eq!(back.filename, "only-name.pdf");
        assert!(back.metadata.is_empty());
        assert!(back.is_ok());
    }
}

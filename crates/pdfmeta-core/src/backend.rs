use thiserror::Error;

use crate::{Metadata, MetadataSource};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("not a PDF: {0}")]
    NotPdf(String),
    #[error("malformed PDF: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a backend pulls out of one document.
#[derive(Debug, Clone, Default)]
pub struct PdfContent {
    pub metadata: Metadata,
    pub sources: Vec<MetadataSource>,
    pub page_count: usize,
    /// Page texts in document order, joined with `'\n'`.
    pub text: String,
}

/// Trait for PDF extraction backends.
///
/// Implementors do the actual decoding; the per-file isolation and batching
/// lives in `pdfmeta_ingest`. A document without metadata is not an error:
/// backends return an empty [`Metadata`] for it.
pub trait PdfBackend: Send + Sync {
    /// Parse an in-memory PDF and return its metadata and full text.
    fn extract(&self, data: &[u8]) -> Result<PdfContent, BackendError>;
}

use std::panic::{self, AssertUnwindSafe};

use pdfmeta_core::BackendError;

// Re-export domain types for convenience
pub use pdfmeta_core::{ExtractionResult, Metadata, MetadataSource, PdfBackend, UploadedFile};

/// How far into the buffer the `%PDF-` marker may appear. Readers tolerate
/// leading junk (mail headers, BOMs) up to this point.
const HEADER_SEARCH_WINDOW: usize = 1024;

const PANIC_MESSAGE: &str = "PDF extraction panicked (malformed document)";

/// Whether `data` carries a `%PDF-` header near its start.
pub fn looks_like_pdf(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Extract metadata and text from one uploaded file.
///
/// Never fails: a buffer that is not a PDF, a document the backend rejects,
/// or a panic inside the backend all produce a result whose `error` is set.
pub fn extract(file: &UploadedFile, backend: &dyn PdfBackend) -> ExtractionResult {
    match try_extract(file, backend) {
        Ok(result) => {
            tracing::debug!(
                file = %file.name,
                pages = result.page_count,
                keys = result.metadata.len(),
                "extracted"
            );
            result
        }
        Err(message) => {
            tracing::warn!(file = %file.name, error = %message, "extraction failed");
            ExtractionResult::failed(&file.name, message)
        }
    }
}

fn try_extract(file: &UploadedFile, backend: &dyn PdfBackend) -> Result<ExtractionResult, String> {
    if file.bytes.is_empty() {
        return Err(BackendError::NotPdf("empty file".into()).to_string());
    }
    if !looks_like_pdf(&file.bytes) {
        return Err(BackendError::NotPdf("missing %PDF- header".into()).to_string());
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.extract(&file.bytes)));
    match outcome {
        Ok(Ok(content)) => Ok(ExtractionResult::from_content(&file.name, content)),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(PANIC_MESSAGE.to_string()),
    }
}

/// Extract every file in order. One result per input, in input order.
pub fn extract_all(files: &[UploadedFile], backend: &dyn PdfBackend) -> Vec<ExtractionResult> {
    extract_all_with_progress(files, backend, |_, _| {})
}

/// Like [`extract_all`], calling `progress(index, result)` after each file.
pub fn extract_all_with_progress(
    files: &[UploadedFile],
    backend: &dyn PdfBackend,
    mut progress: impl FnMut(usize, &ExtractionResult),
) -> Vec<ExtractionResult> {
    let mut results = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let result = extract(file, backend);
        progress(index, &result);
        results.push(result);
    }
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    tracing::info!(files = files.len(), failed, "batch extracted");
    results
}

/// [`extract`] with the default lopdf backend.
#[cfg(feature = "pdf")]
pub fn extract_with_default(file: &UploadedFile) -> ExtractionResult {
    extract(file, &pdfmeta_pdf_lopdf::LopdfBackend::default())
}

/// [`extract_all`] with the default lopdf backend.
#[cfg(feature = "pdf")]
pub fn extract_all_with_default(files: &[UploadedFile]) -> Vec<ExtractionResult> {
    extract_all(files, &pdfmeta_pdf_lopdf::LopdfBackend::default())
}

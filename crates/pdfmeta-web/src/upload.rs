use axum::extract::Multipart;

use pdfmeta_core::UploadedFile;

/// Form field carrying the uploaded PDFs; repeated once per file.
pub const FILES_FIELD: &str = "files";

/// Parse a multipart form upload into the ordered list of uploaded files.
///
/// Every `files` part becomes one [`UploadedFile`], in form order. Parts are
/// not checked for being PDFs here; the extraction pipeline reports bad
/// files individually.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<Vec<UploadedFile>, String> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == FILES_FIELD || name == "files[]" {
            let filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("upload-{}.pdf", files.len() + 1));
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file data for {}: {}", filename, e))?;
            tracing::debug!(file = %filename, bytes = data.len(), "received upload");
            files.push(UploadedFile::new(filename, data.to_vec()));
        } else {
            // Ignore unknown fields
            let _ = field.bytes().await;
        }
    }

    Ok(files)
}

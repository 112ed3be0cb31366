use pdfmeta_core::ExtractionResult;
use serde::{Deserialize, Serialize};

/// Response of `POST /api/extract`: one entry per uploaded part, in order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub results: Vec<ExtractionResult>,
}

/// Body of `POST /api/export`. The browser sends back the results it got
/// from `/api/extract`; the server keeps no session state.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub results: Vec<ExtractionResult>,
    #[serde(default)]
    pub include_text: bool,
    /// `csv` (default) or `json`.
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

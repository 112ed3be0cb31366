use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use pdfmeta_reporting::ExportFormat;

use crate::handlers::error_response;
use crate::models::ExportRequest;
use crate::state::AppState;

pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Response {
    if req.results.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Nothing to export");
    }

    let format = match req.format.as_deref() {
        None => state.settings.export_format,
        Some(s) => match s.parse::<ExportFormat>() {
            Ok(f) => f,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
    };

    let body = match pdfmeta_reporting::export(&req.results, req.include_text, format) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let filename =
        pdfmeta_reporting::export_filename(chrono::Local::now().naive_local(), format);
    tracing::info!(
        files = req.results.len(),
        include_text = req.include_text,
        %filename,
        "exported metadata"
    );

    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

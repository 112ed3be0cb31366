use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::handlers::error_response;
use crate::models::ExtractResponse;
use crate::state::AppState;
use crate::upload;

pub async fn extract(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let files = match upload::parse_multipart(multipart).await {
        Ok(files) => files,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    if files.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No files uploaded");
    }

    // PDF decoding is CPU-bound; keep it off the async workers.
    let backend = Arc::clone(&state.backend);
    let results = tokio::task::spawn_blocking(move || {
        pdfmeta_ingest::extract_all(&files, backend.as_ref())
    })
    .await;

    match results {
        Ok(results) => Json(ExtractResponse { results }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "extraction task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Extraction task error: {}", e),
            )
        }
    }
}

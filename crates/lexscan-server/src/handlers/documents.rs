use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, info, instrument};

use lexscan_core::api_types::UploadResponse;

use crate::handlers::{error_response, status_for};
use crate::state::AppState;

/// PUT /api/documents/{name}: store the raw request body under the upload prefix.
#[instrument(skip(state, body), fields(size_bytes = body.len()))]
pub async fn upload_document(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let size_bytes = body.len();

    match state.analyzer.upload(&name, body.to_vec()).await {
        Ok(document) => {
            info!(document = %document, "Document uploaded");
            let uri = document.to_string();
            (
                StatusCode::CREATED,
                Json(UploadResponse {
                    document,
                    uri,
                    size_bytes,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Upload failed");
            error_response(status_for(&e), format!("Upload failed: {e}"))
        }
    }
}

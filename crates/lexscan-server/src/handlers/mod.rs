pub mod analyses;
pub mod documents;
pub mod health;
pub mod pages;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};

use lexscan_core::LexError;

pub(crate) fn status_for(error: &LexError) -> StatusCode {
    match error {
        LexError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LexError::ReferenceNotFound { .. } | LexError::NotFound(_) => StatusCode::NOT_FOUND,
        LexError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        LexError::Submission(_)
        | LexError::Service(_)
        | LexError::JobFailed { .. }
        | LexError::Generation(_) => StatusCode::BAD_GATEWAY,
        LexError::Config(_) | LexError::Io(_) | LexError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

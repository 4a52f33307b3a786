use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Upload limit for a single document body.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Front end
        .route("/", get(handlers::pages::index))
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Documents
        .route(
            "/api/documents/{name}",
            put(handlers::documents::upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Analyses
        .route(
            "/api/analyses",
            post(handlers::analyses::trigger_analysis).get(handlers::analyses::list_analyses),
        )
        .route("/api/analyses/{id}", get(handlers::analyses::get_analysis))
        .route("/api/analyses/{id}/text", get(handlers::analyses::download_text))
        .route("/api/analyses/{id}/report", get(handlers::analyses::download_report))
}

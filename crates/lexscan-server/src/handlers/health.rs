use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::debug;

use lexscan_core::api_types::{AnalysisRunState, HealthResponse};

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");

    let active_analyses = state
        .runs
        .read()
        .await
        .iter()
        .filter(|run| run.status == AnalysisRunState::Running)
        .count();

    let response = HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        bucket: state.config.bucket.clone(),
        model_id: state.config.model_id.clone(),
        active_analyses,
    };

    (StatusCode::OK, Json(response))
}

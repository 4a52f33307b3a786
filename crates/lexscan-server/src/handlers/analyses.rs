use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use lexscan_analysis::{ANALYSIS_FILE, EXTRACTED_TEXT_FILE};
use lexscan_core::api_types::{
    AnalysisRequest, AnalysisRunState, AnalysisRunStatus, AnalysisRunsResponse,
    AnalysisTriggerResponse,
};
use lexscan_core::{AnalysisKind, AnalysisReport, DocumentReference, LexError, Result};

use crate::handlers::{error_response, status_for};
use crate::state::AppState;

fn resolve_document(state: &AppState, req: &AnalysisRequest) -> Result<DocumentReference> {
    match (&req.document, &req.key) {
        (Some(uri), _) => DocumentReference::parse(uri),
        (None, Some(key)) => state.analyzer.resolve(key),
        (None, None) => Err(LexError::InvalidInput(
            "request must name a 'key' or an s3:// 'document'".into(),
        )),
    }
}

fn selected_kinds(req: &AnalysisRequest) -> Result<Vec<AnalysisKind>> {
    let kinds = req.selected_kinds();
    if kinds.is_empty() {
        return Err(LexError::InvalidInput("select at least one analysis".into()));
    }
    Ok(kinds)
}

/// POST /api/analyses: start text extraction + analysis for a stored document.
/// Returns 202 Accepted immediately with an analysis_id to track progress.
pub async fn trigger_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> impl IntoResponse {
    let resolved = resolve_document(&state, &req)
        .and_then(|document| selected_kinds(&req).map(|kinds| (document, kinds)));
    let (document, kinds) = match resolved {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(error = %e, "Rejected analysis request");
            return error_response(status_for(&e), e.to_string());
        }
    };

    let analysis_id = Uuid::new_v4().to_string();
    info!(analysis_id = %analysis_id, document = %document, kinds = ?kinds, "Triggering analysis (async)");

    state
        .track_run(AnalysisRunStatus {
            analysis_id: analysis_id.clone(),
            document: document.clone(),
            status: AnalysisRunState::Running,
            kinds: kinds.clone(),
            started_at: Utc::now(),
            finished_at: None,
            extracted_chars: None,
            sections: None,
            error: None,
        })
        .await;

    let task_state = state.clone();
    let task_id = analysis_id.clone();
    let task_document = document.clone();
    tokio::spawn(async move {
        let result = task_state
            .analyzer
            .analyze_document(&task_document, &kinds)
            .await;
        record_result(&task_state, &task_id, result).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(AnalysisTriggerResponse {
            analysis_id,
            document,
            status: AnalysisRunState::Running,
            message: "Analysis started, OCR and generation running in background".to_string(),
        }),
    )
        .into_response()
}

async fn record_result(state: &AppState, analysis_id: &str, result: Result<AnalysisReport>) {
    let mut runs = state.runs.write().await;
    let mut reports = state.reports.write().await;

    if let Some(run) = runs.iter_mut().find(|r| r.analysis_id == analysis_id) {
        run.finished_at = Some(Utc::now());
        match result {
            Ok(report) => {
                run.status = AnalysisRunState::Completed;
                run.extracted_chars = Some(report.extracted_text.chars().count());
                run.sections = Some(report.sections.clone());
                reports.insert(analysis_id.to_string(), report);
                info!(analysis_id = %analysis_id, "Analysis completed");
            }
            Err(e) => {
                run.status = AnalysisRunState::Failed;
                run.error = Some(e.to_string());
                error!(analysis_id = %analysis_id, error = %e, "Analysis failed");
            }
        }
    }
}

/// GET /api/analyses: all tracked runs, newest first.
pub async fn list_analyses(State(state): State<AppState>) -> impl IntoResponse {
    let runs = state.runs.read().await;
    let runs_vec: Vec<AnalysisRunStatus> = runs.iter().rev().cloned().collect();
    (StatusCode::OK, Json(AnalysisRunsResponse { runs: runs_vec }))
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let runs = state.runs.read().await;
    match runs.iter().find(|r| r.analysis_id == id) {
        Some(run) => (StatusCode::OK, Json(run.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Analysis {id} not found")),
    }
}

/// Look up a finished report, or explain why there isn't one.
async fn finished_report(state: &AppState, id: &str) -> std::result::Result<AnalysisReport, Response> {
    if let Some(report) = state.reports.read().await.get(id) {
        return Ok(report.clone());
    }

    let runs = state.runs.read().await;
    match runs.iter().find(|r| r.analysis_id == id) {
        Some(run) => Err(error_response(
            StatusCode::CONFLICT,
            format!("Analysis {id} has no report (status: {:?})", run.status),
        )),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Analysis {id} not found"),
        )),
    }
}

fn text_download(file_name: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/analyses/{id}/text: the OCR output as a plain-text download.
pub async fn download_text(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match finished_report(&state, &id).await {
        Ok(report) => text_download(EXTRACTED_TEXT_FILE, report.extracted_text),
        Err(response) => response,
    }
}

/// GET /api/analyses/{id}/report: the rendered report with the requested sections.
pub async fn download_report(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match finished_report(&state, &id).await {
        Ok(report) => text_download(ANALYSIS_FILE, report.render()),
        Err(response) => response,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisKind, AnalysisSections};
use crate::document::DocumentReference;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub bucket: String,
    pub model_id: String,
    pub active_analyses: usize,
}

// --- Documents ---

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document: DocumentReference,
    pub uri: String,
    pub size_bytes: usize,
}

// --- Analyses ---

/// Either a key inside the configured bucket or a full `s3://` reference.
/// `kinds` selects the analyses to run; omitted means all of them.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub kinds: Option<Vec<AnalysisKind>>,
}

impl AnalysisRequest {
    pub fn selected_kinds(&self) -> Vec<AnalysisKind> {
        match &self.kinds {
            Some(kinds) => AnalysisKind::in_report_order(kinds),
            None => AnalysisKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisTriggerResponse {
    pub analysis_id: String,
    pub document: DocumentReference,
    pub status: AnalysisRunState,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisRunState {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRunStatus {
    pub analysis_id: String,
    pub document: DocumentReference,
    pub status: AnalysisRunState,
    pub kinds: Vec<AnalysisKind>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub extracted_chars: Option<usize>,
    pub sections: Option<AnalysisSections>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisRunsResponse {
    pub runs: Vec<AnalysisRunStatus>,
}

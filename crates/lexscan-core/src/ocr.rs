use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::DocumentReference;
use crate::error::Result;

/// Opaque identifier assigned to a text-detection job by the OCR service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InProgress,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub block_type: BlockType,
    pub text: Option<String>,
}

impl TextBlock {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            block_type: BlockType::Line,
            text: Some(text.into()),
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self {
            block_type: BlockType::Word,
            text: Some(text.into()),
        }
    }
}

/// One response from the job-status endpoint. The first page after a job
/// succeeds doubles as the status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub status: JobStatus,
    pub blocks: Vec<TextBlock>,
    pub next_token: Option<String>,
    pub status_message: Option<String>,
}

impl ResultPage {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            blocks: Vec::new(),
            next_token: None,
            status_message: None,
        }
    }
}

#[async_trait]
pub trait OcrService: Send + Sync {
    /// Start an asynchronous text-detection job on a stored document.
    async fn submit_job(&self, reference: &DocumentReference) -> Result<JobId>;

    /// Fetch job status and, once complete, the page selected by `next_token`.
    async fn get_results(&self, job_id: &JobId, next_token: Option<&str>) -> Result<ResultPage>;
}

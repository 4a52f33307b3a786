use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("Document s3://{container}/{key} does not exist")]
    ReferenceNotFound { container: String, key: String },

    #[error("OCR job submission rejected: {0}")]
    Submission(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("OCR job {job_id} failed{}", status_suffix(.message))]
    JobFailed {
        job_id: String,
        message: Option<String>,
    },

    #[error("OCR job {job_id} still in progress after {waited_secs}s")]
    Timeout { job_id: String, waited_secs: u64 },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LexError>;

fn status_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

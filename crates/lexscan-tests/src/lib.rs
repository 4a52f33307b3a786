//! In-memory stand-ins for S3, Textract and Bedrock used by the integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use lexscan_analysis::ContractAnalyzer;
use lexscan_core::config::PollerConfig;
use lexscan_core::document::{DocumentReference, ObjectStore};
use lexscan_core::error::{LexError, Result};
use lexscan_core::generation::GenerationService;
use lexscan_core::ocr::{JobId, JobStatus, OcrService, ResultPage, TextBlock};

pub const BUCKET: &str = "legal-doc-review";

pub fn fast_poller() -> PollerConfig {
    PollerConfig::new(Duration::from_millis(1), Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<DocumentReference, Vec<u8>>>,
    fail_exists: Mutex<Option<String>>,
}

impl MemoryObjectStore {
    pub fn with_objects(references: &[DocumentReference]) -> Self {
        let store = Self::default();
        {
            let mut objects = store.objects.lock().unwrap();
            for reference in references {
                objects.insert(reference.clone(), b"%PDF-1.7".to_vec());
            }
        }
        store
    }

    pub fn fail_exists_with(&self, message: &str) {
        *self.fail_exists.lock().unwrap() = Some(message.to_string());
    }

    pub fn contents(&self, reference: &DocumentReference) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(reference).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn exists(&self, reference: &DocumentReference) -> Result<bool> {
        if let Some(message) = self.fail_exists.lock().unwrap().clone() {
            return Err(LexError::Service(message));
        }
        Ok(self.objects.lock().unwrap().contains_key(reference))
    }

    async fn put(&self, reference: &DocumentReference, bytes: Vec<u8>) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(reference.clone(), bytes);
        Ok(())
    }

    async fn get(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        self.contents(reference).ok_or_else(|| LexError::ReferenceNotFound {
            container: reference.container.clone(),
            key: reference.key.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// OCR service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum OcrCall {
    Submit(DocumentReference),
    Status,
    Page(String),
}

/// Replays a fixed status sequence, then serves pages keyed by continuation token.
pub struct ScriptedOcrService {
    statuses: Mutex<VecDeque<std::result::Result<ResultPage, String>>>,
    pages: Mutex<HashMap<String, Result<ResultPage>>>,
    reject_submission: Option<String>,
    calls: Mutex<Vec<OcrCall>>,
}

impl ScriptedOcrService {
    /// `statuses` are returned for token-less polls in order; the last one repeats.
    pub fn new(statuses: Vec<ResultPage>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().map(Ok).collect()),
            pages: Mutex::new(HashMap::new()),
            reject_submission: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_submission: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Append a status poll that fails with a service error.
    pub fn with_status_error(self, message: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn with_page(self, token: &str, page: ResultPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(token.to_string(), Ok(page));
        self
    }

    pub fn with_page_error(self, token: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(token.to_string(), Err(LexError::Service(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<OcrCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OcrCall::Page(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, OcrCall::Submit(_)))
            .count()
    }

    pub fn status_polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, OcrCall::Status))
            .count()
    }
}

#[async_trait]
impl OcrService for ScriptedOcrService {
    async fn submit_job(&self, reference: &DocumentReference) -> Result<JobId> {
        self.calls
            .lock()
            .unwrap()
            .push(OcrCall::Submit(reference.clone()));
        match &self.reject_submission {
            Some(message) => Err(LexError::Submission(message.clone())),
            None => Ok(JobId::from("job-1")),
        }
    }

    async fn get_results(&self, _job_id: &JobId, next_token: Option<&str>) -> Result<ResultPage> {
        match next_token {
            None => {
                self.calls.lock().unwrap().push(OcrCall::Status);
                let mut statuses = self.statuses.lock().unwrap();
                let page = if statuses.len() > 1 {
                    statuses.pop_front()
                } else {
                    statuses.front().cloned()
                };
                match page {
                    Some(Ok(page)) => Ok(page),
                    Some(Err(message)) => Err(LexError::Service(message)),
                    None => Err(LexError::Service("no scripted status".into())),
                }
            }
            Some(token) => {
                self.calls
                    .lock()
                    .unwrap()
                    .push(OcrCall::Page(token.to_string()));
                match self.pages.lock().unwrap().remove(token) {
                    Some(result) => result,
                    None => Err(LexError::Service(format!("unknown token {token}"))),
                }
            }
        }
    }
}

pub fn succeeded(blocks: Vec<TextBlock>, next_token: Option<&str>) -> ResultPage {
    ResultPage {
        status: JobStatus::Succeeded,
        blocks,
        next_token: next_token.map(str::to_string),
        status_message: None,
    }
}

pub fn failed(message: &str) -> ResultPage {
    ResultPage {
        status: JobStatus::Failed,
        blocks: Vec::new(),
        next_token: None,
        status_message: Some(message.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Generation service
// ---------------------------------------------------------------------------

/// Answers with the first line of each prompt, and remembers every prompt.
#[derive(Default)]
pub struct EchoGenerator {
    prompts: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl EchoGenerator {
    pub fn failing(message: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(message) = &self.fail_with {
            return Err(LexError::Generation(message.clone()));
        }
        let first_line = prompt.lines().next().unwrap_or_default();
        Ok(format!("echo: {first_line}"))
    }
}

pub fn analyzer(
    store: Arc<MemoryObjectStore>,
    ocr: Arc<ScriptedOcrService>,
    generator: Arc<EchoGenerator>,
) -> ContractAnalyzer {
    ContractAnalyzer::new(store, ocr, generator, fast_poller(), BUCKET, "uploads/")
}

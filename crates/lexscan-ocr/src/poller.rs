use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use lexscan_core::config::PollerConfig;
use lexscan_core::document::{DocumentReference, ObjectStore};
use lexscan_core::error::{LexError, Result};
use lexscan_core::ocr::{BlockType, JobId, JobStatus, OcrService, ResultPage};

/// Drives one text-detection job from submission to fully aggregated text.
///
/// The poller owns no state between calls: each [`extract_text`] submits a
/// fresh job, waits for it on a fixed interval, then walks the continuation
/// tokens in order.
///
/// [`extract_text`]: OcrJobPoller::extract_text
pub struct OcrJobPoller {
    store: Arc<dyn ObjectStore>,
    ocr: Arc<dyn OcrService>,
    config: PollerConfig,
}

impl OcrJobPoller {
    pub fn new(store: Arc<dyn ObjectStore>, ocr: Arc<dyn OcrService>, config: PollerConfig) -> Self {
        Self { store, ocr, config }
    }

    #[instrument(skip(self), fields(document = %reference))]
    pub async fn extract_text(&self, reference: &DocumentReference) -> Result<String> {
        if !self.store.exists(reference).await? {
            warn!("Document missing from object store, not submitting OCR job");
            return Err(LexError::ReferenceNotFound {
                container: reference.container.clone(),
                key: reference.key.clone(),
            });
        }

        let job_id = self.ocr.submit_job(reference).await?;
        info!(job_id = %job_id, "OCR job submitted");

        let first = self.wait_for_completion(&job_id).await?;
        let pages = self.collect_pages(&job_id, first).await?;
        let text = aggregate_pages(&pages);

        info!(
            job_id = %job_id,
            pages = pages.len(),
            chars = text.len(),
            "OCR text extraction complete"
        );

        Ok(text)
    }

    /// Poll until the job leaves `IN_PROGRESS`. Returns the first result page.
    async fn wait_for_completion(&self, job_id: &JobId) -> Result<ResultPage> {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        let timed_out = || LexError::Timeout {
            job_id: job_id.to_string(),
            waited_secs: started.elapsed().as_secs(),
        };

        loop {
            let page = tokio::time::timeout_at(deadline, self.ocr.get_results(job_id, None))
                .await
                .map_err(|_| timed_out())??;

            match page.status {
                JobStatus::Succeeded => return Ok(page),
                JobStatus::Failed => {
                    warn!(job_id = %job_id, message = ?page.status_message, "OCR job failed");
                    return Err(LexError::JobFailed {
                        job_id: job_id.to_string(),
                        message: page.status_message,
                    });
                }
                JobStatus::InProgress => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(job_id = %job_id, "OCR job did not finish before the deadline");
                        return Err(timed_out());
                    }
                    debug!(
                        job_id = %job_id,
                        elapsed_secs = started.elapsed().as_secs(),
                        "OCR job in progress, waiting {}s",
                        self.config.poll_interval.as_secs()
                    );
                    tokio::time::sleep_until((now + self.config.poll_interval).min(deadline)).await;
                }
            }
        }
    }

    /// Follow continuation tokens from the first page until a page has none.
    async fn collect_pages(&self, job_id: &JobId, first: ResultPage) -> Result<Vec<ResultPage>> {
        let mut next_token = first.next_token.clone();
        let mut pages = vec![first];

        while let Some(token) = next_token {
            debug!(job_id = %job_id, page = pages.len() + 1, "Fetching next OCR result page");
            let page = self.ocr.get_results(job_id, Some(&token)).await?;
            next_token = page.next_token.clone();
            pages.push(page);
        }

        Ok(pages)
    }
}

/// Join every `LINE` block with newlines, page by page, each page followed by a newline.
pub fn aggregate_pages(pages: &[ResultPage]) -> String {
    let mut text = String::new();
    for page in pages {
        let lines: Vec<&str> = page
            .blocks
            .iter()
            .filter(|block| block.block_type == BlockType::Line)
            .filter_map(|block| block.text.as_deref())
            .collect();
        text.push_str(&lines.join("\n"));
        text.push('\n');
    }
    text
}

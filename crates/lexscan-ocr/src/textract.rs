use async_trait::async_trait;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::types::{
    Block, BlockType as TextractBlockType, DocumentLocation, JobStatus as TextractJobStatus,
    S3Object,
};
use aws_sdk_textract::Client;
use tracing::{debug, info};

use lexscan_core::document::DocumentReference;
use lexscan_core::error::{LexError, Result};
use lexscan_core::ocr::{BlockType, JobId, JobStatus, OcrService, ResultPage, TextBlock};

/// [`OcrService`] backed by Amazon Textract asynchronous text detection.
pub struct TextractOcrService {
    client: Client,
}

impl TextractOcrService {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

fn map_status(status: Option<&TextractJobStatus>) -> Result<JobStatus> {
    match status {
        Some(TextractJobStatus::InProgress) => Ok(JobStatus::InProgress),
        Some(TextractJobStatus::Succeeded) => Ok(JobStatus::Succeeded),
        // Partial results are treated as a failed job.
        Some(TextractJobStatus::Failed) | Some(TextractJobStatus::PartialSuccess) => {
            Ok(JobStatus::Failed)
        }
        Some(other) => Err(LexError::Service(format!(
            "Textract returned unrecognised job status '{}'",
            other.as_str()
        ))),
        None => Err(LexError::Service(
            "Textract response carried no job status".into(),
        )),
    }
}

fn map_block(block: &Block) -> TextBlock {
    let block_type = match block.block_type() {
        Some(TextractBlockType::Line) => BlockType::Line,
        Some(TextractBlockType::Word) => BlockType::Word,
        Some(TextractBlockType::Page) => BlockType::Page,
        Some(other) => BlockType::Other(other.as_str().to_string()),
        None => BlockType::Other("UNKNOWN".to_string()),
    };
    TextBlock {
        block_type,
        text: block.text().map(str::to_string),
    }
}

#[async_trait]
impl OcrService for TextractOcrService {
    async fn submit_job(&self, reference: &DocumentReference) -> Result<JobId> {
        let location = DocumentLocation::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&reference.container)
                    .name(&reference.key)
                    .build(),
            )
            .build();

        let output = self
            .client
            .start_document_text_detection()
            .document_location(location)
            .send()
            .await
            .map_err(|e| {
                LexError::Submission(format!(
                    "StartDocumentTextDetection failed for {reference}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let job_id = output.job_id().ok_or_else(|| {
            LexError::Submission("StartDocumentTextDetection returned no JobId".into())
        })?;

        info!(document = %reference, job_id = %job_id, "Started Textract text detection");
        Ok(JobId::from(job_id))
    }

    async fn get_results(&self, job_id: &JobId, next_token: Option<&str>) -> Result<ResultPage> {
        let output = self
            .client
            .get_document_text_detection()
            .job_id(job_id.as_str())
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                LexError::Service(format!(
                    "GetDocumentTextDetection failed for job {job_id}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let status = map_status(output.job_status())?;
        let blocks: Vec<TextBlock> = output.blocks().iter().map(map_block).collect();

        debug!(
            job_id = %job_id,
            status = ?status,
            blocks = blocks.len(),
            has_next = output.next_token().is_some(),
            "Textract result page received"
        );

        Ok(ResultPage {
            status,
            blocks,
            next_token: output.next_token().map(str::to_string),
            status_message: output.status_message().map(str::to_string),
        })
    }
}

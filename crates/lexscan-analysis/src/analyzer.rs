use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use lexscan_core::analysis::{AnalysisKind, AnalysisReport, AnalysisSections};
use lexscan_core::config::PollerConfig;
use lexscan_core::document::{validate_file_name, DocumentReference, ObjectStore};
use lexscan_core::error::{LexError, Result};
use lexscan_core::generation::GenerationService;
use lexscan_core::ocr::OcrService;
use lexscan_ocr::OcrJobPoller;

pub const EXTRACTED_TEXT_FILE: &str = "extracted.txt";
pub const ANALYSIS_FILE: &str = "analysis_output.txt";

/// Upload → text extraction → selected generation passes. Shared by the CLI and the HTTP server.
pub struct ContractAnalyzer {
    store: Arc<dyn ObjectStore>,
    poller: OcrJobPoller,
    generator: Arc<dyn GenerationService>,
    bucket: String,
    upload_prefix: String,
}

impl ContractAnalyzer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        ocr: Arc<dyn OcrService>,
        generator: Arc<dyn GenerationService>,
        poller_config: PollerConfig,
        bucket: impl Into<String>,
        upload_prefix: impl Into<String>,
    ) -> Self {
        Self {
            poller: OcrJobPoller::new(store.clone(), ocr, poller_config),
            store,
            generator,
            bucket: bucket.into(),
            upload_prefix: upload_prefix.into(),
        }
    }

    /// Reference for `file_name` under the upload prefix.
    pub fn reference_for(&self, file_name: &str) -> Result<DocumentReference> {
        let name = validate_file_name(file_name)?;
        Ok(DocumentReference::new(
            &self.bucket,
            format!("{}{}", self.upload_prefix, name),
        ))
    }

    /// Reference for an existing key in the configured bucket, taken verbatim.
    pub fn reference_for_key(&self, key: &str) -> Result<DocumentReference> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LexError::InvalidInput("object key is empty".into()));
        }
        Ok(DocumentReference::new(&self.bucket, key))
    }

    /// Resolve a user-supplied target: an `s3://` reference, a key containing `/`
    /// (verbatim), or a bare file name as passed to [`upload`](Self::upload).
    pub fn resolve(&self, target: &str) -> Result<DocumentReference> {
        let target = target.trim();
        if target.starts_with("s3://") {
            DocumentReference::parse(target)
        } else if target.contains('/') {
            self.reference_for_key(target)
        } else {
            self.reference_for(target)
        }
    }

    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<DocumentReference> {
        if bytes.is_empty() {
            return Err(LexError::InvalidInput(format!("'{file_name}' is empty")));
        }
        let reference = self.reference_for(file_name)?;
        self.store.put(&reference, bytes).await?;
        Ok(reference)
    }

    /// Document text: plain-text objects are read as-is, everything else goes through OCR.
    pub async fn extract(&self, reference: &DocumentReference) -> Result<String> {
        if is_plain_text(&reference.key) {
            let bytes = self.store.get(reference).await?;
            info!(document = %reference, size_bytes = bytes.len(), "Read plain-text document, skipping OCR");
            return String::from_utf8(bytes).map_err(|_| {
                LexError::InvalidInput(format!("{reference} is not valid UTF-8 text"))
            });
        }
        self.poller.extract_text(reference).await
    }

    /// Run the selected analysis prompts in report order, one generation call at a time.
    pub async fn analyze_text(
        &self,
        contract_text: &str,
        kinds: &[AnalysisKind],
    ) -> Result<AnalysisSections> {
        let kinds = AnalysisKind::in_report_order(kinds);
        if kinds.is_empty() {
            return Err(LexError::InvalidInput("select at least one analysis".into()));
        }

        let mut sections = AnalysisSections::default();
        for kind in kinds {
            info!(kind = %kind, "Generating analysis section");
            let text = self.generator.generate(&kind.prompt(contract_text)).await?;
            sections.set(kind, text);
        }
        Ok(sections)
    }

    #[instrument(skip(self, kinds), fields(document = %reference))]
    pub async fn analyze_document(
        &self,
        reference: &DocumentReference,
        kinds: &[AnalysisKind],
    ) -> Result<AnalysisReport> {
        let extracted_text = self.extract(reference).await?;
        let sections = self.analyze_text(&extracted_text, kinds).await?;

        info!(chars = extracted_text.len(), "Document analysis complete");

        Ok(AnalysisReport {
            document: Some(reference.clone()),
            extracted_text,
            sections,
            generated_at: Utc::now(),
        })
    }

    pub async fn process_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        kinds: &[AnalysisKind],
    ) -> Result<AnalysisReport> {
        let reference = self.upload(file_name, bytes).await?;
        self.analyze_document(&reference, kinds).await
    }
}

/// Whether `key` names a plain-text document, judged by its extension.
pub fn is_plain_text(key: &str) -> bool {
    mime_guess::from_path(key)
        .first()
        .is_some_and(|mime| mime.essence_str() == "text/plain")
}

/// Write the extracted text and rendered report into `dir`.
pub async fn write_artifacts(dir: &Path, report: &AnalysisReport) -> Result<()> {
    tokio::fs::write(dir.join(EXTRACTED_TEXT_FILE), &report.extracted_text).await?;
    tokio::fs::write(dir.join(ANALYSIS_FILE), report.render()).await?;
    info!(dir = %dir.display(), "Wrote analysis artifacts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_detected_by_extension() {
        assert!(is_plain_text("uploads/lease.txt"));
        assert!(is_plain_text("LEASE.TXT"));
        assert!(!is_plain_text("uploads/lease.pdf"));
        assert!(!is_plain_text("uploads/scan.png"));
        assert!(!is_plain_text("uploads/no_extension"));
    }
}

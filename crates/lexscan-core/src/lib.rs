pub mod analysis;
pub mod api_types;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod ocr;

pub use analysis::{AnalysisKind, AnalysisReport, AnalysisSections};
pub use config::{AppConfig, PollerConfig};
pub use document::{DocumentReference, ObjectStore};
pub use error::{LexError, Result};
pub use generation::GenerationService;
pub use ocr::{BlockType, JobId, JobStatus, OcrService, ResultPage, TextBlock};

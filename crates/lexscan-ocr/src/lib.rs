mod poller;
mod textract;

pub use poller::{aggregate_pages, OcrJobPoller};
pub use textract::TextractOcrService;

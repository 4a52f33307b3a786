mod analyzer;

pub use analyzer::{
    is_plain_text, write_artifacts, ContractAnalyzer, ANALYSIS_FILE, EXTRACTED_TEXT_FILE,
};

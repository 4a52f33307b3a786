use async_trait::async_trait;

use crate::error::Result;

/// A hosted text-generation model invoked with a fixed instruction and sampling setup.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

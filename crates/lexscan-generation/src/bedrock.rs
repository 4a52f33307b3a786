use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use lexscan_core::error::{LexError, Result};
use lexscan_core::generation::GenerationService;

use crate::reply::GenerationReply;

const SYSTEM_PROMPT: &str = "You are a legal document assistant. You help lawyers summarize \
contracts, extract key clauses, and identify legal risks or unusual terms. Be concise and \
accurate. IMPORTANT: Always provide your responses in plain text format, not JSON. Use \
markdown formatting for headings and lists.";

const FORMAT_INSTRUCTION: &str = "\n\nIMPORTANT: Provide your response in plain text format, \
not as JSON. Use markdown formatting for structure.";

const SCHEMA_VERSION: &str = "messages-v1";
const MAX_TOKENS: u32 = 1000;
const TOP_P: f32 = 0.9;
const TOP_K: u32 = 20;
const TEMPERATURE: f32 = 0.3;

// ── Nova messages-v1 request types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NovaRequest {
    schema_version: &'static str,
    system: Vec<TextPart>,
    messages: Vec<NovaMessage>,
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct NovaMessage {
    role: &'static str,
    content: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: u32,
    top_p: f32,
    top_k: u32,
    temperature: f32,
}

/// Text generation through Bedrock `InvokeModel` with a fixed legal-assistant
/// instruction and fixed sampling parameters.
pub struct BedrockGenerationClient {
    client: Client,
    model_id: String,
}

impl BedrockGenerationClient {
    pub fn new(sdk_config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            model_id: model_id.into(),
        }
    }

    fn build_request(prompt: &str) -> NovaRequest {
        NovaRequest {
            schema_version: SCHEMA_VERSION,
            system: vec![TextPart {
                text: SYSTEM_PROMPT.to_string(),
            }],
            messages: vec![NovaMessage {
                role: "user",
                content: vec![TextPart {
                    text: format!("{prompt}{FORMAT_INSTRUCTION}"),
                }],
            }],
            inference_config: InferenceConfig {
                max_tokens: MAX_TOKENS,
                top_p: TOP_P,
                top_k: TOP_K,
                temperature: TEMPERATURE,
            },
        }
    }

    /// Normalize a raw reply body. Bodies that are not JSON are returned as text.
    fn normalize_body(body: &[u8]) -> String {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => {
                let reply = GenerationReply::classify(value);
                if reply.is_raw() {
                    warn!("Unrecognised generation reply shape, falling back to raw rendering");
                }
                reply.into_text()
            }
            Err(e) => {
                warn!(error = %e, "Generation reply is not JSON, returning body as text");
                String::from_utf8_lossy(body).into_owned()
            }
        }
    }
}

#[async_trait]
impl GenerationService for BedrockGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_vec(&Self::build_request(prompt))?;

        debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            "Sending generation request to Bedrock"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                LexError::Generation(format!(
                    "InvokeModel failed for {}: {}",
                    self.model_id,
                    DisplayErrorContext(&e)
                ))
            })?;

        let text = Self::normalize_body(output.body().as_ref());

        info!(
            model = %self.model_id,
            response_len = text.len(),
            "Received generation response"
        );

        Ok(text)
    }
}

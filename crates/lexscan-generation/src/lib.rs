mod bedrock;
mod reply;

pub use bedrock::BedrockGenerationClient;
pub use reply::GenerationReply;

mod error;
mod llm;
pub mod retry;

pub use error::SkydeskError;
pub use llm::{
    LlmRequest, LlmResponse, Message, ModelReply, Role, ToolCall, ToolCallingLlm, ToolSpec,
};
pub use retry::{retry_with_backoff, RetryPolicy};

pub type Value = serde_json::Value;

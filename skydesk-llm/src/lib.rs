mod config;

// OpenAI-compatible client
pub mod openai_compatible;

pub use config::{
    LlmConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, MODEL_ENV,
};
pub use openai_compatible::{ChatCompletionRequest, OpenAiCompatibleClient};
pub use skydesk_core::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};

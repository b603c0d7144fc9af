use serde::{Deserialize, Serialize};
use skydesk_core::SkydeskError;
use thiserror::Error;

use crate::conversation::ConversationError;

/// Why a turn ended without a model-written answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm request failed: {0}")]
    Llm(#[from] SkydeskError),
    #[error("model returned neither text nor tool calls")]
    EmptyResponse,
    #[error("model still requested tools after {rounds} round(s)")]
    ToolRoundCapExceeded { rounds: usize, preamble: String },
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    LlmUnavailable,
    EmptyResponse,
    ToolRoundCap,
    InvalidConversation,
}

impl AgentError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            AgentError::Llm(_) => FallbackReason::LlmUnavailable,
            AgentError::EmptyResponse => FallbackReason::EmptyResponse,
            AgentError::ToolRoundCapExceeded { .. } => FallbackReason::ToolRoundCap,
            AgentError::Conversation(_) => FallbackReason::InvalidConversation,
        }
    }
}

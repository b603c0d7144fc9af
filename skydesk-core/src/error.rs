use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkydeskError {
    #[error("LLM provider failed: {0}")]
    LlmProvider(String),
    #[error("LLM provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("LLM provider rate limited the request (retry_after={retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    #[error("Parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Max retries ({max}) exceeded: {last}")]
    MaxRetriesExceeded { max: usize, last: Box<SkydeskError> },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl SkydeskError {
    /// Transient upstream faults worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SkydeskError::LlmProvider(_)
            | SkydeskError::RateLimited { .. }
            | SkydeskError::Timeout(_) => true,
            SkydeskError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SkydeskError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

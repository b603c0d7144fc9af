use std::time::Duration;

use skydesk_core::RetryPolicy;

use crate::prompt::DEFAULT_SYSTEM_PROMPT;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 2;
pub const DEFAULT_HISTORY_WINDOW: usize = 20;
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEGRADED_REPLY: &str =
    "I'm having trouble processing that right now. Please try again in a moment.";
pub const EMPTY_ANSWER_REPLY: &str =
    "I'm sorry, I couldn't put together an answer to that. Could you rephrase your question?";
pub const TOOL_ROUND_CAP_REPLY: &str =
    "I wasn't able to finish looking that up. Please try again or contact customer service.";

/// Per-session behavior of the support agent.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub system_prompt: String,
    /// Tool rounds allowed per user message before tools are withheld.
    pub max_tool_rounds: usize,
    /// Turns of history sent with each request; `None` sends everything.
    pub history_window: Option<usize>,
    pub llm_timeout: Duration,
    pub retry: RetryPolicy,
    pub degraded_reply: String,
    pub empty_answer_reply: String,
    pub tool_round_cap_reply: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            history_window: Some(DEFAULT_HISTORY_WINDOW),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            retry: RetryPolicy::default(),
            degraded_reply: DEGRADED_REPLY.to_string(),
            empty_answer_reply: EMPTY_ANSWER_REPLY.to_string(),
            tool_round_cap_reply: TOOL_ROUND_CAP_REPLY.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_degraded_reply(mut self, reply: impl Into<String>) -> Self {
        self.degraded_reply = reply.into();
        self
    }
}

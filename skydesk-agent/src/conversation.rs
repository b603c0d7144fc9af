//! Ordered turn log for one session.
//!
//! The log enforces the pairing rule providers check: once an assistant turn
//! requests tools, the next turns must be exactly one result per call id, in
//! request order, before anything else may be appended.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use skydesk_core::{Message, ToolCall};
use thiserror::Error;

use crate::executor::ToolResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationTurn {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        content: String,
    },
}

impl ConversationTurn {
    pub fn to_message(&self) -> Message {
        match self {
            ConversationTurn::User { content } => Message::user(content.clone()),
            ConversationTurn::Assistant {
                content,
                tool_calls,
            } if tool_calls.is_empty() => Message::assistant(content.clone()),
            ConversationTurn::Assistant {
                content,
                tool_calls,
            } => Message::assistant_tool_calls(content.clone(), tool_calls.clone()),
            ConversationTurn::ToolResult {
                call_id, content, ..
            } => Message::tool(call_id.clone(), content.clone()),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, ConversationTurn::User { .. })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("{0} tool result(s) still pending")]
    PendingToolResults(usize),
    #[error("a tool request must contain at least one call")]
    EmptyToolRequest,
    #[error("duplicate tool call id: {0}")]
    DuplicateCallId(String),
    #[error("unexpected tool result for {call_id} (expected {expected:?})")]
    UnexpectedToolResult {
        call_id: String,
        expected: Option<String>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct ConversationState {
    turns: Vec<ConversationTurn>,
    pending: VecDeque<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        self.turns.push(ConversationTurn::User {
            content: content.into(),
        });
        Ok(())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        self.turns.push(ConversationTurn::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        });
        Ok(())
    }

    pub fn push_tool_request(
        &mut self,
        preamble: impl Into<String>,
        calls: Vec<ToolCall>,
    ) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        if calls.is_empty() {
            return Err(ConversationError::EmptyToolRequest);
        }
        let mut seen = HashSet::new();
        if let Some(call) = calls.iter().find(|call| !seen.insert(call.id.as_str())) {
            return Err(ConversationError::DuplicateCallId(call.id.clone()));
        }

        self.pending = calls.iter().map(|call| call.id.clone()).collect();
        self.turns.push(ConversationTurn::Assistant {
            content: preamble.into(),
            tool_calls: calls,
        });
        Ok(())
    }

    /// Results must arrive in the order the calls were requested.
    pub fn push_tool_result(&mut self, result: &ToolResult) -> Result<(), ConversationError> {
        match self.pending.front() {
            Some(expected) if *expected == result.call_id => {
                self.pending.pop_front();
                self.turns.push(ConversationTurn::ToolResult {
                    call_id: result.call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    content: result.content.clone(),
                });
                Ok(())
            }
            expected => Err(ConversationError::UnexpectedToolResult {
                call_id: result.call_id.clone(),
                expected: expected.cloned(),
            }),
        }
    }

    /// Drops a trailing tool request whose results never all arrived, along with
    /// the partial results. Returns how many turns were removed.
    pub fn rollback_incomplete_exchange(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        self.pending.clear();

        let Some(start) = self.turns.iter().rposition(|turn| {
            matches!(turn, ConversationTurn::Assistant { tool_calls, .. } if !tool_calls.is_empty())
        }) else {
            return 0;
        };
        let removed = self.turns.len() - start;
        self.turns.truncate(start);
        removed
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn has_pending_tool_results(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The most recent turns, at most `limit` of them, starting on a user turn so
    /// a tool result is never separated from the request that produced it.
    pub fn window(&self, limit: Option<usize>) -> &[ConversationTurn] {
        let Some(limit) = limit else {
            return &self.turns;
        };
        if self.turns.len() <= limit {
            return &self.turns;
        }

        let cut = self.turns.len() - limit;
        let start = self.turns[cut..]
            .iter()
            .position(ConversationTurn::is_user)
            .map(|offset| cut + offset)
            .or_else(|| self.turns.iter().rposition(ConversationTurn::is_user))
            .unwrap_or(0);
        &self.turns[start..]
    }

    pub fn to_messages(&self, system_prompt: &str, limit: Option<usize>) -> Vec<Message> {
        let window = self.window(limit);
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(window.iter().map(ConversationTurn::to_message));
        messages
    }

    fn ensure_settled(&self) -> Result<(), ConversationError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ConversationError::PendingToolResults(self.pending.len()))
        }
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use skydesk_core::{
    retry_with_backoff, LlmRequest, LlmResponse, ModelReply, SkydeskError, ToolCall,
    ToolCallingLlm,
};
use skydesk_flights::FlightStore;
use uuid::Uuid;

use crate::catalog::ToolCatalog;
use crate::config::SessionConfig;
use crate::conversation::ConversationState;
use crate::error::{AgentError, FallbackReason};
use crate::executor::{ToolExecutor, ToolResult};
use crate::phase::LoopPhase;

/// Everything that happened while answering one user message.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TurnReport {
    pub answer: String,
    pub phases: Vec<LoopPhase>,
    /// Provider requests sent, retries included.
    pub llm_calls: usize,
    pub tool_rounds: usize,
    pub tool_results: Vec<ToolResult>,
    pub fallback: Option<FallbackReason>,
}

impl TurnReport {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn final_phase(&self) -> Option<LoopPhase> {
        self.phases.last().copied()
    }

    fn enter(&mut self, phase: LoopPhase) {
        tracing::debug!(?phase, "entering phase");
        self.phases.push(phase);
    }
}

/// One customer conversation: history, tools, and the model that drives them.
pub struct Session {
    id: String,
    llm: Arc<dyn ToolCallingLlm>,
    executor: ToolExecutor,
    conversation: ConversationState,
    config: SessionConfig,
    turns_processed: usize,
}

impl Session {
    pub fn new(llm: Arc<dyn ToolCallingLlm>, store: Arc<FlightStore>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            llm,
            executor: ToolExecutor::new(store),
            conversation: ConversationState::new(),
            config: SessionConfig::default(),
            turns_processed: 0,
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn catalog(&self) -> &ToolCatalog {
        self.executor.catalog()
    }

    pub fn flights(&self) -> &FlightStore {
        self.executor.store()
    }

    pub fn turns_processed(&self) -> usize {
        self.turns_processed
    }

    pub fn reset_conversation(&mut self) {
        self.conversation.clear();
        tracing::info!(session_id = %self.id, "conversation reset");
    }

    /// Answers one user message. Always returns text; failures become a
    /// fallback reply rather than an error.
    pub async fn process_message(&mut self, message: &str) -> String {
        self.process_turn(message).await.answer
    }

    #[tracing::instrument(name = "turn", skip_all, fields(session_id = %self.id, turn = self.turns_processed + 1))]
    pub async fn process_turn(&mut self, message: &str) -> TurnReport {
        self.turns_processed += 1;
        let mut report = TurnReport {
            phases: vec![LoopPhase::AwaitingUserInput],
            ..TurnReport::default()
        };

        match self.run_turn(message, &mut report).await {
            Ok(answer) => report.answer = answer,
            Err(err) => {
                let reason = err.fallback_reason();
                let dropped = self.conversation.rollback_incomplete_exchange();
                tracing::warn!(error = %err, ?reason, dropped, "turn ended with a fallback reply");

                let answer = self.fallback_text(err);
                if let Err(push_err) = self.conversation.push_assistant(answer.clone()) {
                    tracing::warn!(error = %push_err, "could not record fallback reply");
                }
                report.enter(LoopPhase::Fallback);
                report.fallback = Some(reason);
                report.answer = answer;
            }
        }

        tracing::info!(
            llm_calls = report.llm_calls,
            tool_rounds = report.tool_rounds,
            fallback = report.used_fallback(),
            "turn complete"
        );
        report
    }

    async fn run_turn(
        &mut self,
        message: &str,
        report: &mut TurnReport,
    ) -> Result<String, AgentError> {
        self.conversation.push_user(message)?;
        let mut rounds = 0;

        loop {
            let offer_tools = rounds < self.config.max_tool_rounds;
            report.enter(if rounds == 0 {
                LoopPhase::RequestingCompletion
            } else {
                LoopPhase::RequestingFollowup
            });

            let response = self.request_completion(offer_tools, report).await?;
            match response.into_reply() {
                ModelReply::DirectAnswer(text) => {
                    report.enter(if rounds == 0 {
                        LoopPhase::DirectAnswer
                    } else {
                        LoopPhase::FinalAnswer
                    });
                    self.conversation.push_assistant(text.clone())?;
                    return Ok(text);
                }
                ModelReply::Empty => return Err(AgentError::EmptyResponse),
                ModelReply::ToolCallBatch { preamble, .. } if !offer_tools => {
                    return Err(AgentError::ToolRoundCapExceeded { rounds, preamble });
                }
                ModelReply::ToolCallBatch { preamble, calls } => {
                    report.enter(LoopPhase::ToolCallsPending);
                    let calls = normalize_call_ids(calls);
                    self.conversation
                        .push_tool_request(preamble, calls.clone())?;

                    report.enter(LoopPhase::ExecutingTools);
                    let results = self.executor.execute_all(&calls).await;
                    for result in &results {
                        self.conversation.push_tool_result(result)?;
                    }

                    rounds += 1;
                    report.tool_rounds = rounds;
                    report.tool_results.extend(results);
                }
            }
        }
    }

    async fn request_completion(
        &self,
        offer_tools: bool,
        report: &mut TurnReport,
    ) -> Result<LlmResponse, SkydeskError> {
        let messages = self
            .conversation
            .to_messages(&self.config.system_prompt, self.config.history_window);
        let mut request = LlmRequest::new(messages);
        if offer_tools {
            request = request.with_tools(self.executor.catalog().specs());
        }

        let llm = &self.llm;
        let timeout = self.config.llm_timeout;
        let mut attempts = 0;
        let result = retry_with_backoff(&self.config.retry, |attempt| {
            attempts = attempt;
            let request = request.clone();
            async move {
                match tokio::time::timeout(timeout, llm.invoke(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(SkydeskError::Timeout(timeout)),
                }
            }
        })
        .await;

        report.llm_calls += attempts;
        result
    }

    fn fallback_text(&self, err: AgentError) -> String {
        match err {
            AgentError::ToolRoundCapExceeded { preamble, .. } if !preamble.trim().is_empty() => {
                preamble
            }
            AgentError::ToolRoundCapExceeded { .. } => self.config.tool_round_cap_reply.clone(),
            AgentError::EmptyResponse => self.config.empty_answer_reply.clone(),
            AgentError::Llm(_) | AgentError::Conversation(_) => self.config.degraded_reply.clone(),
        }
    }
}

/// Providers occasionally omit or repeat call ids; results are keyed by id, so
/// every call gets a unique one.
fn normalize_call_ids(calls: Vec<ToolCall>) -> Vec<ToolCall> {
    let mut seen = HashSet::new();
    calls
        .into_iter()
        .map(|mut call| {
            if call.id.trim().is_empty() || !seen.insert(call.id.clone()) {
                call.id = format!("call_{}", Uuid::new_v4().simple());
                seen.insert(call.id.clone());
            }
            call
        })
        .collect()
}

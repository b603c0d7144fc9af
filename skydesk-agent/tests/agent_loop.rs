use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use skydesk_agent::{
    ConversationTurn, FallbackReason, LoopPhase, Session, SessionConfig, ToolResultKind,
    DEGRADED_REPLY, EMPTY_ANSWER_REPLY, TOOL_ROUND_CAP_REPLY,
};
use skydesk_core::{
    LlmRequest, LlmResponse, RetryPolicy, Role, SkydeskError, ToolCall, ToolCallingLlm,
};
use skydesk_flights::FlightStore;

/// Replays canned replies in order and records every request it receives.
struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<LlmResponse, SkydeskError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<Result<LlmResponse, SkydeskError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ToolCallingLlm for ScriptedLlm {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SkydeskError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SkydeskError::Custom("script exhausted".to_string())))
    }
}

/// Asks for the same lookup forever.
struct LoopingLlm {
    preamble: String,
    requests: Mutex<Vec<LlmRequest>>,
}

#[async_trait::async_trait]
impl ToolCallingLlm for LoopingLlm {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SkydeskError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        Ok(LlmResponse {
            content: self.preamble.clone(),
            tool_calls: vec![lookup(&format!("call_{}", requests.len()), "AA123")],
        })
    }
}

struct FailingLlm {
    error: fn() -> SkydeskError,
    calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl ToolCallingLlm for FailingLlm {
    async fn invoke(&self, _request: LlmRequest) -> Result<LlmResponse, SkydeskError> {
        *self.calls.lock().unwrap() += 1;
        Err((self.error)())
    }
}

struct SlowLlm;

#[async_trait::async_trait]
impl ToolCallingLlm for SlowLlm {
    async fn invoke(&self, _request: LlmRequest) -> Result<LlmResponse, SkydeskError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(LlmResponse::text("too late"))
    }
}

fn lookup(id: &str, flight_number: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "get_flight_info".to_string(),
        args: json!({ "flight_number": flight_number }),
    }
}

fn no_retry() -> SessionConfig {
    SessionConfig::default().with_retry(RetryPolicy::none())
}

fn session(llm: Arc<dyn ToolCallingLlm>) -> Session {
    Session::new(llm, Arc::new(FlightStore::sample())).with_config(no_retry())
}

#[tokio::test]
async fn flight_question_runs_one_tool_round() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![lookup("call_1", "AA123")])),
        Ok(LlmResponse::text(
            "Flight AA123 from New York to Los Angeles is On Time, departing 08:00 AM from gate A12.",
        )),
    ]);
    let mut session = session(llm.clone());

    let report = session.process_turn("What's the status of flight AA123?").await;

    assert!(report.answer.contains("On Time"));
    assert_eq!(report.llm_calls, 2);
    assert_eq!(report.tool_rounds, 1);
    assert_eq!(report.fallback, None);
    assert_eq!(
        report.phases,
        vec![
            LoopPhase::AwaitingUserInput,
            LoopPhase::RequestingCompletion,
            LoopPhase::ToolCallsPending,
            LoopPhase::ExecutingTools,
            LoopPhase::RequestingFollowup,
            LoopPhase::FinalAnswer,
        ]
    );
    assert_eq!(report.tool_results.len(), 1);
    assert_eq!(report.tool_results[0].kind, ToolResultKind::Success);

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 3);
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[0].messages[0].role, Role::System);

    let followup = &requests[1].messages;
    assert_eq!(followup.len(), 4);
    assert_eq!(followup[2].role, Role::Assistant);
    assert_eq!(followup[2].tool_calls[0].id, "call_1");
    assert_eq!(followup[3].role, Role::Tool);
    assert_eq!(followup[3].tool_call_id.as_deref(), Some("call_1"));
    assert!(followup[3].content.contains("Flight AA123"));

    // user, tool request, tool result, answer
    assert_eq!(session.conversation().len(), 4);
}

#[tokio::test]
async fn direct_answer_is_returned_unchanged() {
    let answer = "I'd be happy to help with baggage policy. Checked bags up to 50 lbs are included.";
    let llm = ScriptedLlm::new(vec![Ok(LlmResponse::text(answer))]);
    let mut session = session(llm.clone());

    let report = session.process_turn("What's your baggage policy?").await;

    assert_eq!(report.answer, answer);
    assert_eq!(report.llm_calls, 1);
    assert_eq!(report.tool_rounds, 0);
    assert_eq!(report.final_phase(), Some(LoopPhase::DirectAnswer));
    assert!(LoopPhase::DirectAnswer.is_terminal());
    assert!(!LoopPhase::ExecutingTools.is_terminal());
    assert_eq!(llm.requests().len(), 1);
}

#[test]
fn sessions_get_distinct_ids_and_keep_their_config() {
    let store = Arc::new(FlightStore::sample());
    let first = Session::new(ScriptedLlm::new(Vec::new()), store.clone())
        .with_config(no_retry().with_max_tool_rounds(4));
    let second = Session::new(ScriptedLlm::new(Vec::new()), store);

    assert!(!first.id().is_empty());
    assert_ne!(first.id(), second.id());
    assert_eq!(first.config().max_tool_rounds, 4);
    assert_eq!(second.config().max_tool_rounds, 2);
}

#[tokio::test]
async fn unknown_flight_still_gets_an_answer() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![lookup("call_1", "ZZ000")])),
        Ok(LlmResponse::text(
            "I couldn't find flight ZZ000. Please double-check the number.",
        )),
    ]);
    let mut session = session(llm.clone());

    let answer = session.process_message("Where is flight ZZ000?").await;

    assert!(!answer.is_empty());
    let requests = llm.requests();
    let tool_message = &requests[1].messages[3];
    assert!(tool_message.content.contains("not found"));
    assert!(tool_message.content.contains("ZZ000"));
}

#[tokio::test]
async fn history_carries_into_the_next_turn() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::text("Hello! How can I help?")),
        Ok(LlmResponse::text("Sure, which flight?")),
    ]);
    let mut session = session(llm.clone());

    session.process_message("Hi").await;
    session.process_message("I need flight info").await;

    let requests = llm.requests();
    let contents: Vec<&str> = requests[1]
        .messages
        .iter()
        .skip(1)
        .map(|message| message.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec!["Hi", "Hello! How can I help?", "I need flight info"]
    );
    assert_eq!(session.turns_processed(), 2);
}

#[tokio::test]
async fn reset_starts_a_fresh_conversation() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::text("first answer")),
        Ok(LlmResponse::text("second answer")),
    ]);
    let mut session = session(llm.clone());

    session.process_message("first question").await;
    session.reset_conversation();
    assert!(session.conversation().is_empty());

    session.process_message("second question").await;
    let requests = llm.requests();
    assert_eq!(requests[1].messages.len(), 2);
    assert_eq!(requests[1].messages[1].content, "second question");
}

#[tokio::test]
async fn tool_rounds_are_capped() {
    let llm = Arc::new(LoopingLlm {
        preamble: String::new(),
        requests: Mutex::new(Vec::new()),
    });
    let mut session = session(llm.clone());

    let report = session.process_turn("AA123?").await;

    assert_eq!(report.answer, TOOL_ROUND_CAP_REPLY);
    assert_eq!(report.fallback, Some(FallbackReason::ToolRoundCap));
    assert_eq!(report.tool_rounds, 2);
    assert_eq!(report.llm_calls, 3);

    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].tools.len(), 3);
    assert!(requests[2].tools.is_empty());
    drop(requests);

    // user, two complete tool exchanges, fallback answer
    assert_eq!(session.conversation().len(), 6);
    assert!(!session.conversation().has_pending_tool_results());
}

#[tokio::test]
async fn capped_turn_prefers_the_model_preamble() {
    let llm = Arc::new(LoopingLlm {
        preamble: "Let me check that flight for you.".to_string(),
        requests: Mutex::new(Vec::new()),
    });
    let mut session = Session::new(llm, Arc::new(FlightStore::sample()))
        .with_config(no_retry().with_max_tool_rounds(1));

    let report = session.process_turn("AA123?").await;

    assert_eq!(report.answer, "Let me check that flight for you.");
    assert_eq!(report.llm_calls, 2);
}

#[tokio::test]
async fn empty_reply_uses_fallback_text() {
    let llm = ScriptedLlm::new(vec![Ok(LlmResponse::text("   "))]);
    let mut session = session(llm);

    let report = session.process_turn("hello?").await;

    assert_eq!(report.answer, EMPTY_ANSWER_REPLY);
    assert_eq!(report.fallback, Some(FallbackReason::EmptyResponse));
    assert_eq!(report.final_phase(), Some(LoopPhase::Fallback));
}

#[tokio::test]
async fn empty_followup_keeps_the_tool_exchange() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![lookup("call_1", "UA789")])),
        Ok(LlmResponse::text("")),
    ]);
    let mut session = session(llm.clone());

    let report = session.process_turn("Is UA789 boarding?").await;

    assert_eq!(report.answer, EMPTY_ANSWER_REPLY);
    assert_eq!(report.fallback, Some(FallbackReason::EmptyResponse));
    assert_eq!(report.tool_rounds, 1);
    assert_eq!(llm.requests().len(), 2);

    // user, tool request, tool result, fallback answer
    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 4);
    assert!(matches!(
        &turns[2],
        ConversationTurn::ToolResult { call_id, .. } if call_id == "call_1"
    ));
    assert_eq!(
        turns[3],
        ConversationTurn::Assistant {
            content: EMPTY_ANSWER_REPLY.to_string(),
            tool_calls: Vec::new(),
        }
    );
    assert!(!session.conversation().has_pending_tool_results());
}

#[tokio::test]
async fn custom_degraded_reply_is_used() {
    let llm = Arc::new(FailingLlm {
        error: || SkydeskError::Upstream {
            status: 400,
            body: "bad request".to_string(),
        },
        calls: Mutex::new(0),
    });
    let config = no_retry().with_degraded_reply("Our assistant is offline, please call us.");
    let mut session = Session::new(llm, Arc::new(FlightStore::sample())).with_config(config);

    let report = session.process_turn("hi").await;

    assert_eq!(report.answer, "Our assistant is offline, please call us.");
    assert_eq!(
        session.config().degraded_reply,
        "Our assistant is offline, please call us."
    );
    assert!(report.final_phase().is_some_and(LoopPhase::is_terminal));
}

#[tokio::test]
async fn transient_failures_are_retried_then_degrade() {
    let llm = Arc::new(FailingLlm {
        error: || SkydeskError::LlmProvider("connection reset".to_string()),
        calls: Mutex::new(0),
    });
    let retry = RetryPolicy::default()
        .with_base_delay(Duration::ZERO)
        .with_jitter(false);
    let mut session = Session::new(llm.clone(), Arc::new(FlightStore::sample()))
        .with_config(SessionConfig::default().with_retry(retry));

    let report = session.process_turn("Is DL456 delayed?").await;

    assert_eq!(report.answer, DEGRADED_REPLY);
    assert_eq!(report.fallback, Some(FallbackReason::LlmUnavailable));
    assert_eq!(report.llm_calls, 3);
    assert_eq!(*llm.calls.lock().unwrap(), 3);
    // the user turn and the fallback stay in history
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn credential_errors_are_not_retried() {
    let llm = Arc::new(FailingLlm {
        error: || SkydeskError::InvalidConfig("bad key".to_string()),
        calls: Mutex::new(0),
    });
    let mut session = Session::new(llm.clone(), Arc::new(FlightStore::sample()))
        .with_config(SessionConfig::default().with_retry(RetryPolicy::default()));

    let answer = session.process_message("hi").await;

    assert_eq!(answer, DEGRADED_REPLY);
    assert_eq!(*llm.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mut session = Session::new(Arc::new(SlowLlm), Arc::new(FlightStore::sample()))
        .with_config(no_retry().with_llm_timeout(Duration::from_millis(20)));

    let report = session.process_turn("hi").await;

    assert_eq!(report.answer, DEGRADED_REPLY);
    assert_eq!(report.fallback, Some(FallbackReason::LlmUnavailable));
}

#[tokio::test]
async fn failed_followup_keeps_completed_tool_exchange() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![lookup("call_1", "AA123")])),
        Err(SkydeskError::Upstream {
            status: 400,
            body: "bad request".to_string(),
        }),
    ]);
    let mut session = session(llm);

    let report = session.process_turn("AA123?").await;

    assert_eq!(report.answer, DEGRADED_REPLY);
    assert_eq!(report.tool_rounds, 1);
    assert_eq!(session.conversation().len(), 4);
    assert!(!session.conversation().has_pending_tool_results());
}

#[tokio::test]
async fn several_calls_in_one_batch_keep_their_order() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![
            lookup("call_a", "UA789"),
            lookup("call_b", "SW101"),
        ])),
        Ok(LlmResponse::text("UA789 is boarding and SW101 is cancelled.")),
    ]);
    let mut session = session(llm.clone());

    let report = session.process_turn("UA789 and SW101?").await;

    let ids: Vec<&str> = report
        .tool_results
        .iter()
        .map(|result| result.call_id.as_str())
        .collect();
    assert_eq!(ids, vec!["call_a", "call_b"]);

    let followup = &llm.requests()[1].messages;
    assert_eq!(followup[3].tool_call_id.as_deref(), Some("call_a"));
    assert!(followup[3].content.contains("Boarding"));
    assert_eq!(followup[4].tool_call_id.as_deref(), Some("call_b"));
    assert!(followup[4].content.contains("Cancelled"));
}

#[tokio::test]
async fn missing_or_repeated_call_ids_are_replaced() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![
            lookup("", "AA123"),
            lookup("dup", "DL456"),
            lookup("dup", "UA789"),
        ])),
        Ok(LlmResponse::text("done")),
    ]);
    let mut session = session(llm.clone());

    let report = session.process_turn("three flights").await;

    assert_eq!(report.answer, "done");
    let ids: Vec<&str> = report
        .tool_results
        .iter()
        .map(|result| result.call_id.as_str())
        .collect();
    assert!(ids[0].starts_with("call_"));
    assert_eq!(ids[1], "dup");
    assert!(ids[2].starts_with("call_"));
    assert_ne!(ids[0], ids[2]);
}

#[tokio::test]
async fn unknown_tool_request_is_answered_with_an_error_result() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmResponse::tool_calls(vec![ToolCall {
            id: "call_1".to_string(),
            name: "book_seat".to_string(),
            args: json!({}),
        }])),
        Ok(LlmResponse::text("I can't book seats, but I can look up flights.")),
    ]);
    let mut session = session(llm.clone());

    let report = session.process_turn("Book me a seat").await;

    assert_eq!(report.fallback, None);
    assert_eq!(report.tool_results[0].kind, ToolResultKind::UnknownTool);
    assert!(llm.requests()[1].messages[3]
        .content
        .starts_with("Unknown tool: book_seat"));
}

#[tokio::test]
async fn empty_user_message_is_still_processed() {
    let llm = ScriptedLlm::new(vec![Ok(LlmResponse::text("How can I help you today?"))]);
    let mut session = session(llm.clone());

    let answer = session.process_message("").await;

    assert_eq!(answer, "How can I help you today?");
    assert_eq!(llm.requests()[0].messages[1].content, "");
}

use serde_json::json;
use skydesk_core::{LlmRequest, LlmResponse, Message, ModelReply, Role, ToolCall};

#[test]
fn response_without_calls_decodes_as_direct_answer() {
    let reply = LlmResponse::text("I'd be happy to help with baggage policy").into_reply();
    assert_eq!(
        reply,
        ModelReply::DirectAnswer("I'd be happy to help with baggage policy".to_string())
    );
}

#[test]
fn response_with_calls_decodes_as_batch_and_keeps_preamble() {
    let response = LlmResponse {
        content: "Let me check.".to_string(),
        tool_calls: vec![ToolCall {
            id: "call_1".to_string(),
            name: "get_flight_info".to_string(),
            args: json!({"flight_number": "AA123"}),
        }],
    };

    match response.into_reply() {
        ModelReply::ToolCallBatch { preamble, calls } => {
            assert_eq!(preamble, "Let me check.");
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].id, "call_1");
        }
        other => panic!("expected tool call batch, got {other:?}"),
    }
}

#[test]
fn whitespace_only_response_is_empty() {
    assert_eq!(LlmResponse::text("  \n").into_reply(), ModelReply::Empty);
    assert_eq!(LlmResponse::default().into_reply(), ModelReply::Empty);
}

#[test]
fn message_serializes_role_lowercase_and_skips_empty_fields() {
    let value = serde_json::to_value(Message::user("hi")).unwrap();
    assert_eq!(value, json!({"role": "user", "content": "hi"}));

    let tool = serde_json::to_value(Message::tool("call_9", "result")).unwrap();
    assert_eq!(tool["role"], "tool");
    assert_eq!(tool["tool_call_id"], "call_9");
}

#[test]
fn request_defaults_to_client_model() {
    let request = LlmRequest::new(vec![Message::system("sys")]);
    assert!(request.model.is_empty());
    assert!(request.tools.is_empty());
    assert_eq!(request.messages[0].role, Role::System);
}

//! Client for any provider speaking OpenAI's chat completions format.

use std::time::Duration;

use reqwest::{header::HeaderMap, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use skydesk_core::{
    LlmRequest, LlmResponse, Message, Role, SkydeskError, ToolCall, ToolCallingLlm, ToolSpec,
    Value,
};

use crate::LlmConfig;

/// Request body for the chat completions endpoint
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireToolCall {
    /// Some providers leave this out; the session assigns one when blank.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the provider sends them.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolSpec,
}

/// Non-streaming response from chat completions
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// OpenAI-style error response
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiError {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let tool_calls = if message.tool_calls.is_empty() {
            None
        } else {
            Some(
                message
                    .tool_calls
                    .into_iter()
                    .map(WireToolCall::from)
                    .collect(),
            )
        };
        // Assistant turns that only carry tool calls go out with a null content.
        let content = if tool_calls.is_some() && message.content.is_empty() {
            None
        } else {
            Some(message.content)
        };

        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id,
        }
    }
}

impl From<ToolCall> for WireToolCall {
    fn from(call: ToolCall) -> Self {
        let arguments = match call.args {
            Value::String(raw) => raw,
            other => other.to_string(),
        };
        Self {
            id: call.id,
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name,
                arguments,
            },
        }
    }
}

impl From<WireToolCall> for ToolCall {
    /// Unparseable argument text is kept verbatim as a string value so the
    /// caller can report it back to the model instead of failing the request.
    fn from(call: WireToolCall) -> Self {
        let raw = call.function.arguments;
        let args = if raw.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        };
        Self {
            id: call.id,
            name: call.function.name,
            args,
        }
    }
}

impl From<ToolSpec> for WireTool {
    fn from(spec: ToolSpec) -> Self {
        Self {
            kind: function_type(),
            function: spec,
        }
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    endpoint: Url,
    api_key: SecretString,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    pub fn new(config: LlmConfig) -> Result<Self, SkydeskError> {
        let endpoint = chat_completions_url(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SkydeskError::InvalidConfig(err.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key,
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn build_request(&self, request: LlmRequest) -> ChatCompletionRequest {
        let LlmRequest {
            model,
            messages,
            tools,
            max_tokens,
            temperature,
        } = request;

        let model = if model.is_empty() {
            self.model.clone()
        } else {
            model
        };
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (
                Some(tools.into_iter().map(WireTool::from).collect()),
                Some("auto".to_string()),
            )
        };

        ChatCompletionRequest {
            model,
            messages: messages.into_iter().map(WireMessage::from).collect(),
            tools,
            tool_choice,
            temperature: temperature.or(self.temperature),
            max_tokens: max_tokens.or(self.max_tokens),
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SkydeskError {
        if err.is_timeout() {
            SkydeskError::Timeout(self.timeout)
        } else {
            SkydeskError::LlmProvider(err.to_string())
        }
    }
}

fn chat_completions_url(base_url: &str) -> Result<Url, SkydeskError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(SkydeskError::InvalidConfig("base URL must not be empty".to_string()));
    }

    let mut base = Url::parse(trimmed)
        .map_err(|err| SkydeskError::InvalidConfig(format!("invalid base URL {trimmed:?}: {err}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("chat/completions")
        .map_err(|err| SkydeskError::InvalidConfig(err.to_string()))
}

fn status_error(status: StatusCode, headers: &HeaderMap, body: String) -> SkydeskError {
    let detail = serde_json::from_str::<OpenAiError>(&body)
        .map(|parsed| parsed.error.message)
        .unwrap_or(body);

    match status {
        StatusCode::TOO_MANY_REQUESTS => SkydeskError::RateLimited {
            retry_after: headers
                .get("Retry-After")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SkydeskError::InvalidConfig(format!(
            "provider rejected the credentials ({status}): {detail}"
        )),
        _ => SkydeskError::Upstream {
            status: status.as_u16(),
            body: detail,
        },
    }
}

#[async_trait::async_trait]
impl ToolCallingLlm for OpenAiCompatibleClient {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SkydeskError> {
        let body = self.build_request(request);
        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            "sending chat completion"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !status.is_success() {
            return Err(status_error(status, &headers, text));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|err| SkydeskError::ParseFailed {
                output: text.clone(),
                reason: err.to_string(),
            })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SkydeskError::ParseFailed {
                output: text,
                reason: "no choices returned".to_string(),
            })?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(ToolCall::from)
                .collect(),
        })
    }
}

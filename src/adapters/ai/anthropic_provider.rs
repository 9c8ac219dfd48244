//! Anthropic Provider - dialogue and structured output over the Messages API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let provider = AnthropicProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Dialogue uses Server-Sent Events. Text arrives in `content_block_delta`
//! events; a tool call is assembled from `input_json_delta` fragments and
//! emitted when its block stops. Structured output forces a single tool call
//! whose input is the requested object.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::conversation::ToolCall;
use crate::ports::{
    AIError, DialogueEvent, DialogueProvider, DialogueRequest, DialogueStream, Message,
    MessageRole, ProviderInfo, StructuredOutputProvider, StructuredRequest,
};

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Default generation budget.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
            max_tokens: 2048,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the default generation budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    /// Converts history to Anthropic's format.
    ///
    /// The API requires alternating roles starting with `user`, so adjacent
    /// messages of the same role are merged.
    fn to_anthropic_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
        let mut converted: Vec<AnthropicMessage> = Vec::with_capacity(messages.len());
        for msg in messages.iter().filter(|m| !m.content.trim().is_empty()) {
            let role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            match converted.last_mut() {
                Some(last) if last.role == role => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&msg.content);
                }
                _ => converted.push(AnthropicMessage {
                    role: role.to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        if converted.first().map_or(true, |m| m.role != "user") {
            converted.insert(
                0,
                AnthropicMessage {
                    role: "user".to_string(),
                    content: "(continuing our conversation)".to_string(),
                },
            );
        }
        converted
    }

    fn to_dialogue_request(&self, request: &DialogueRequest) -> AnthropicRequest {
        let tools = request.tools.as_ref().filter(|t| !t.is_empty()).map(|tools| {
            tools.iter().map(|t| t.to_anthropic_format()).collect()
        });

        AnthropicRequest {
            model: self.config.model.clone(),
            messages: Self::to_anthropic_messages(&request.messages),
            system: Some(request.system_prompt.clone()).filter(|s| !s.is_empty()),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            stream: Some(true),
            tools,
            tool_choice: None,
        }
    }

    fn to_structured_request(&self, request: &StructuredRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: self.config.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            system: Some(request.system_prompt.clone()).filter(|s| !s.is_empty()),
            max_tokens: self.config.max_tokens,
            stream: None,
            tools: Some(vec![serde_json::json!({
                "name": request.name,
                "description": request.description,
                "input_schema": request.schema,
            })]),
            tool_choice: Some(serde_json::json!({ "type": "tool", "name": request.name })),
        }
    }

    /// Sends a request.
    async fn send(&self, body: &AnthropicRequest) -> Result<Response, AIError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })?;
        Self::handle_response_status(response).await
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let rest = &message[message.find("try again in ")? + 13..];
                let end = rest.find(|c: char| !c.is_ascii_digit())?;
                rest[..end].parse::<u32>().ok()
            })
            .unwrap_or(60)
    }
}

#[async_trait]
impl DialogueProvider for AnthropicProvider {
    async fn stream_dialogue(&self, request: DialogueRequest) -> Result<DialogueStream, AIError> {
        let body = self.to_dialogue_request(&request);
        let response = self.send(&body).await?;

        let stream = response
            .bytes_stream()
            .scan(SseParser::default(), |parser, chunk| {
                let events = match chunk {
                    Ok(bytes) => parser.feed(&bytes),
                    Err(e) => vec![Err(AIError::network(format!("Stream error: {}", e)))],
                };
                futures::future::ready(Some(events))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model)
    }
}

#[async_trait]
impl StructuredOutputProvider for AnthropicProvider {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, AIError> {
        let body = self.to_structured_request(&request);
        let response = self.send(&body).await?;

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "tool_use")
            .and_then(|block| block.input)
            .ok_or_else(|| AIError::parse("Response contained no tool_use block"))
    }
}

/// A tool_use block being assembled from stream fragments.
#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    input_json: String,
}

impl PartialToolCall {
    fn finish(self) -> ToolCall {
        let raw = self.input_json.trim();
        let parameters = if raw.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            // Unparseable input is passed through so validation can reject it.
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        ToolCall::new(self.id, self.name, parameters)
    }
}

/// Incremental SSE parser.
///
/// Network chunks may split anywhere, including inside a multi-byte UTF-8
/// character, so bytes are buffered and only complete lines are decoded.
#[derive(Debug, Default)]
struct SseParser {
    buffer: Vec<u8>,
    current_event: String,
    tools: HashMap<u64, PartialToolCall>,
}

impl SseParser {
    fn feed(&mut self, bytes: &[u8]) -> Vec<Result<DialogueEvent, AIError>> {
        self.buffer.extend_from_slice(bytes);
        let mut results = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(event_type) = line.strip_prefix("event: ") {
                self.current_event = event_type.to_string();
            } else if let Some(data) = line.strip_prefix("data: ") {
                if let Some(event) = self.handle_data(data) {
                    results.push(event);
                }
            }
        }
        results
    }

    fn handle_data(&mut self, data: &str) -> Option<Result<DialogueEvent, AIError>> {
        let payload: Value = serde_json::from_str(data).ok()?;
        let index = payload.get("index").and_then(Value::as_u64).unwrap_or(0);

        match self.current_event.as_str() {
            "content_block_start" => {
                let block = payload.get("content_block")?;
                if block.get("type").and_then(Value::as_str) == Some("tool_use") {
                    self.tools.insert(
                        index,
                        PartialToolCall {
                            id: block.get("id")?.as_str()?.to_string(),
                            name: block.get("name")?.as_str()?.to_string(),
                            input_json: String::new(),
                        },
                    );
                }
                None
            }
            "content_block_delta" => {
                let delta = payload.get("delta")?;
                match delta.get("type").and_then(Value::as_str) {
                    Some("text_delta") => {
                        let text = delta.get("text")?.as_str()?;
                        (!text.is_empty()).then(|| Ok(DialogueEvent::TextDelta(text.to_string())))
                    }
                    Some("input_json_delta") => {
                        let fragment = delta.get("partial_json")?.as_str()?;
                        if let Some(tool) = self.tools.get_mut(&index) {
                            tool.input_json.push_str(fragment);
                        }
                        None
                    }
                    _ => None,
                }
            }
            "content_block_stop" => self
                .tools
                .remove(&index)
                .map(|tool| Ok(DialogueEvent::ToolCall(tool.finish()))),
            "message_stop" => Some(Ok(DialogueEvent::Finished)),
            "error" => {
                let message = payload
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Stream error");
                Some(Err(AIError::unavailable(message)))
            }
            _ => None,
        }
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    input: Option<Value>,
}

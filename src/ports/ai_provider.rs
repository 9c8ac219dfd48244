//! AI Provider Ports - dialogue and structured-output delegates.
//!
//! These ports abstract every interaction with a language model so the
//! orchestrator, classifier and narrative generator stay provider-agnostic.
//!
//! # Design
//!
//! - Dialogue is streamed as text deltas interleaved with tool calls
//! - `tools: None` disables tool use for a forced-text reply
//! - Structured output returns one JSON object or fails; callers validate it
//! - No retries at this layer; callers decide how to degrade

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::conversation::{ToolCall, ToolDefinition};

/// Stream of dialogue events produced by one delegate call.
pub type DialogueStream = Pin<Box<dyn Stream<Item = Result<DialogueEvent, AIError>> + Send>>;

/// Port for the streaming dialogue delegate.
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    /// Opens a streaming dialogue call.
    ///
    /// The stream yields text deltas and complete tool calls in the order
    /// the model produced them, then `Finished`.
    async fn stream_dialogue(&self, request: DialogueRequest) -> Result<DialogueStream, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Port for the structured-output delegate.
#[async_trait]
pub trait StructuredOutputProvider: Send + Sync {
    /// Returns one JSON object intended to match `request.schema`.
    ///
    /// Conformance is not guaranteed; callers must validate the result.
    async fn generate(&self, request: StructuredRequest) -> Result<serde_json::Value, AIError>;
}

/// Request for one dialogue pass.
#[derive(Debug, Clone)]
pub struct DialogueRequest {
    pub system_prompt: String,
    /// Bounded history plus the current user message, oldest first.
    pub messages: Vec<Message>,
    /// Tools offered for this pass. `None` disables tool use.
    pub tools: Option<Vec<ToolDefinition>>,
    pub max_tokens: Option<u32>,
}

impl DialogueRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            tools: None,
            max_tokens: None,
        }
    }

    /// Offers tools for this pass.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn tools_enabled(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Event emitted by the dialogue delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// A complete tool invocation.
    ToolCall(ToolCall),
    /// Generation ended.
    Finished,
}

/// Request for a single structured object.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Name of the output shape (used as the forced tool name).
    pub name: String,
    pub description: String,
    /// JSON Schema the object should satisfy.
    pub schema: serde_json::Value,
    pub system_prompt: String,
    pub prompt: String,
}

impl StructuredRequest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            system_prompt: String::new(),
            prompt: String::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "anthropic", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::assessment_tools;

    #[test]
    fn dialogue_request_defaults_to_tools_disabled() {
        let request = DialogueRequest::new("system", vec![Message::user("Hello")]);
        assert!(!request.tools_enabled());
        assert_eq!(request.messages[0].role, MessageRole::User);

        let request = request.with_tools(assessment_tools()).with_max_tokens(512);
        assert!(request.tools_enabled());
        assert_eq!(request.max_tokens, Some(512));
    }

    #[test]
    fn structured_request_builder_works() {
        let request = StructuredRequest::new("classify", "Classify", serde_json::json!({}))
            .with_system_prompt("Be strict")
            .with_prompt("We have 10 customers");

        assert_eq!(request.name, "classify");
        assert_eq!(request.system_prompt, "Be strict");
        assert_eq!(request.prompt, "We have 10 customers");
    }

    #[test]
    fn network_and_timeout_are_retryable() {
        assert!(AIError::network("reset").is_retryable());
        assert!(AIError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(!AIError::parse("bad json").is_retryable());
        assert!(!AIError::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn ports_are_object_safe() {
        fn _dialogue(_p: &dyn DialogueProvider) {}
        fn _structured(_p: &dyn StructuredOutputProvider) {}
    }
}

//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the dialogue and
//! structured-output ports, allowing tests and keyless development to run
//! without calling real AI APIs.
//!
//! # Features
//!
//! - Scripted dialogue passes (text and tool calls, consumed in order)
//! - Scripted structured outputs, with a schema-derived default
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_dialogue(MockDialogue::text("Tell me about your customers."))
//!     .with_structured_output(json!({ "level": "high", "rationale": "counted" }));
//! ```

use async_trait::async_trait;
use futures::stream;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::ToolCall;
use crate::ports::{
    AIError, DialogueEvent, DialogueProvider, DialogueRequest, DialogueStream, ProviderInfo,
    StructuredOutputProvider, StructuredRequest,
};

/// One step of a scripted dialogue pass.
#[derive(Debug, Clone)]
pub enum MockStep {
    Text(String),
    Tool(ToolCall),
    /// Fails the stream at this point.
    Fail(MockError),
}

/// A scripted dialogue pass.
#[derive(Debug, Clone)]
pub enum MockDialogue {
    /// Stream these steps, then `Finished`.
    Steps(Vec<MockStep>),
    /// Fail before any event is produced.
    Error(MockError),
}

impl MockDialogue {
    /// A pass that only says `text`.
    pub fn text(text: impl Into<String>) -> Self {
        MockDialogue::Steps(vec![MockStep::Text(text.into())])
    }

    /// A pass that only calls tools.
    pub fn tools(calls: Vec<ToolCall>) -> Self {
        MockDialogue::Steps(calls.into_iter().map(MockStep::Tool).collect())
    }

    /// A pass that produces nothing.
    pub fn silent() -> Self {
        MockDialogue::Steps(Vec::new())
    }
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    dialogues: Arc<Mutex<VecDeque<MockDialogue>>>,
    structured: Arc<Mutex<VecDeque<Result<Value, MockError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    dialogue_calls: Arc<Mutex<Vec<DialogueRequest>>>,
    structured_calls: Arc<Mutex<Vec<StructuredRequest>>>,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            dialogues: Arc::new(Mutex::new(VecDeque::new())),
            structured: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            dialogue_calls: Arc::new(Mutex::new(Vec::new())),
            structured_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a dialogue pass to the queue.
    pub fn with_dialogue(self, dialogue: MockDialogue) -> Self {
        locked(&self.dialogues).push_back(dialogue);
        self
    }

    /// Adds a structured output to the queue.
    pub fn with_structured_output(self, value: Value) -> Self {
        locked(&self.structured).push_back(Ok(value));
        self
    }

    /// Adds a structured-output failure to the queue.
    pub fn with_structured_error(self, error: MockError) -> Self {
        locked(&self.structured).push_back(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of dialogue calls made.
    pub fn dialogue_call_count(&self) -> usize {
        locked(&self.dialogue_calls).len()
    }

    /// Returns all recorded dialogue calls.
    pub fn dialogue_calls(&self) -> Vec<DialogueRequest> {
        locked(&self.dialogue_calls).clone()
    }

    /// Returns the number of structured-output calls made.
    pub fn structured_call_count(&self) -> usize {
        locked(&self.structured_calls).len()
    }

    /// Returns all recorded structured-output calls.
    pub fn structured_calls(&self) -> Vec<StructuredRequest> {
        locked(&self.structured_calls).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        locked(&self.dialogue_calls).clear();
        locked(&self.structured_calls).clear();
    }

    fn next_dialogue(&self) -> MockDialogue {
        locked(&self.dialogues)
            .pop_front()
            .unwrap_or_else(|| MockDialogue::text("Mock response"))
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Builds a minimal object satisfying `schema`'s required properties.
///
/// Strings take the first enum value or a placeholder, arrays are empty.
fn placeholder_for_schema(schema: &Value) -> Value {
    let mut object = serde_json::Map::new();
    let properties = schema.get("properties").and_then(Value::as_object);
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for name in required.iter().filter_map(Value::as_str) {
        let property = properties.and_then(|p| p.get(name));
        let value = match property.and_then(|p| p.get("type")).and_then(Value::as_str) {
            Some("array") => json!([]),
            Some("object") => property.map(placeholder_for_schema).unwrap_or(json!({})),
            Some("boolean") => json!(false),
            Some("integer") | Some("number") => json!(0),
            _ => property
                .and_then(|p| p.get("enum"))
                .and_then(Value::as_array)
                .and_then(|values| values.first().cloned())
                .unwrap_or_else(|| json!(format!("Mock {}", name))),
        };
        object.insert(name.to_string(), value);
    }
    Value::Object(object)
}

#[async_trait]
impl DialogueProvider for MockAIProvider {
    async fn stream_dialogue(&self, request: DialogueRequest) -> Result<DialogueStream, AIError> {
        let tools_enabled = request.tools_enabled();
        locked(&self.dialogue_calls).push(request);
        self.simulate_latency().await;

        let steps = match self.next_dialogue() {
            MockDialogue::Error(err) => return Err(err.into()),
            MockDialogue::Steps(steps) => steps,
        };

        let mut events = Vec::with_capacity(steps.len() + 1);
        for step in steps {
            match step {
                MockStep::Text(text) => events.push(Ok(DialogueEvent::TextDelta(text))),
                // A tools-disabled pass cannot call tools.
                MockStep::Tool(call) if tools_enabled => {
                    events.push(Ok(DialogueEvent::ToolCall(call)))
                }
                MockStep::Tool(_) => {}
                MockStep::Fail(err) => {
                    events.push(Err(err.into()));
                    return Ok(Box::pin(stream::iter(events)));
                }
            }
        }
        events.push(Ok(DialogueEvent::Finished));
        Ok(Box::pin(stream::iter(events)))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}

#[async_trait]
impl StructuredOutputProvider for MockAIProvider {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, AIError> {
        let default = placeholder_for_schema(&request.schema);
        locked(&self.structured_calls).push(request);
        self.simulate_latency().await;

        match locked(&self.structured).pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err.into()),
            None => Ok(default),
        }
    }
}

//! Tool call and response types.
//!
//! These are the request/response value objects for tool execution.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AssessmentError;

/// A request from the dialogue delegate to invoke a tool.
///
/// Parameters arrive as raw JSON and are validated server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back with the result
    id: String,

    /// Name of the tool to invoke
    name: String,

    /// Parameters for the tool (JSON object)
    parameters: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parameters,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &serde_json::Value {
        &self.parameters
    }
}

/// Response from executing a tool.
///
/// Failures carry a machine-readable `error_code` and structured `details`
/// (such as valid or missing topic ids) so the delegate can correct itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the tool executed successfully
    success: bool,

    /// Data returned by the tool (if successful)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,

    /// Error message (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    details: serde_json::Value,
}

impl ToolResponse {
    /// Creates a successful response with data.
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            details: serde_json::Value::Null,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_code: Some(error_code.into()),
            details: serde_json::Value::Null,
        }
    }

    /// Adds structured details to an error response.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Returns whether the tool succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the response data (if any).
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Returns the error message (if any).
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn details(&self) -> &serde_json::Value {
        &self.details
    }

    /// Serializes the response for the delegate.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "success": self.success, "error": self.error })
        })
    }
}

impl From<&AssessmentError> for ToolResponse {
    fn from(err: &AssessmentError) -> Self {
        ToolResponse::error(err.to_string(), err.code().to_string()).with_details(err.details())
    }
}

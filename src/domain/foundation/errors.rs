//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

use super::{DomainArea, SessionId};

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' exceeds {max} characters (got {actual})")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidTopic,

    // Not found errors
    SessionNotFound,
    ReportNotFound,

    // State errors
    SessionExpired,
    SessionAbandoned,
    InvalidStateTransition,
    StateConflict,
    TurnInProgress,
    NoInputsCaptured,

    // Delegate errors
    DelegateError,
    NoResponse,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidTopic => "INVALID_TOPIC",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::ReportNotFound => "REPORT_NOT_FOUND",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::SessionAbandoned => "SESSION_ABANDONED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::StateConflict => "STATE_CONFLICT",
            ErrorCode::TurnInProgress => "TURN_IN_PROGRESS",
            ErrorCode::NoInputsCaptured => "NO_INPUTS_CAPTURED",
            ErrorCode::DelegateError => "DELEGATE_ERROR",
            ErrorCode::NoResponse => "NO_RESPONSE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Returned by the persistence ports.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

/// Errors surfaced by the assessment core to its callers.
///
/// Validation and state-conflict variants carry enough structure for a
/// calling agent to correct itself (valid or missing topic ids).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("Unknown topic '{topic_id}' for domain {domain}")]
    InvalidTopic {
        domain: DomainArea,
        topic_id: String,
        valid_topic_ids: Vec<String>,
    },

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session expired: {0}")]
    Expired(SessionId),

    #[error("{message}")]
    StateConflict {
        code: ErrorCode,
        message: String,
        missing_topic_ids: Vec<String>,
    },

    #[error("No inputs captured for session {0}")]
    NoInputsCaptured(SessionId),

    #[error("Delegate error: {0}")]
    Delegate(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AssessmentError {
    /// Creates a state conflict without topic detail.
    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        AssessmentError::StateConflict {
            code,
            message: message.into(),
            missing_topic_ids: Vec::new(),
        }
    }

    /// Creates a state conflict naming the topics that are still uncovered.
    pub fn uncovered_topics(domain: DomainArea, missing_topic_ids: Vec<String>) -> Self {
        AssessmentError::StateConflict {
            code: ErrorCode::StateConflict,
            message: format!(
                "Cannot leave {} while {} topic(s) remain uncovered",
                domain,
                missing_topic_ids.len()
            ),
            missing_topic_ids,
        }
    }

    /// Creates a field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AssessmentError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AssessmentError::InvalidTopic { .. } => ErrorCode::InvalidTopic,
            AssessmentError::Validation { .. } => ErrorCode::ValidationFailed,
            AssessmentError::NotFound(_) => ErrorCode::SessionNotFound,
            AssessmentError::Expired(_) => ErrorCode::SessionExpired,
            AssessmentError::StateConflict { code, .. } => *code,
            AssessmentError::NoInputsCaptured(_) => ErrorCode::NoInputsCaptured,
            AssessmentError::Delegate(_) => ErrorCode::DelegateError,
            AssessmentError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns structured detail for callers that can self-correct.
    pub fn details(&self) -> serde_json::Value {
        match self {
            AssessmentError::InvalidTopic {
                domain,
                topic_id,
                valid_topic_ids,
            } => serde_json::json!({
                "domain": domain,
                "topic_id": topic_id,
                "valid_topic_ids": valid_topic_ids,
            }),
            AssessmentError::Validation { field, .. } => serde_json::json!({ "field": field }),
            AssessmentError::StateConflict {
                missing_topic_ids, ..
            } if !missing_topic_ids.is_empty() => {
                serde_json::json!({ "missing_topic_ids": missing_topic_ids })
            }
            _ => serde_json::Value::Null,
        }
    }
}

impl From<DomainError> for AssessmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                AssessmentError::Persistence(err.message)
            }
            code => AssessmentError::conflict(code, err.message),
        }
    }
}

impl From<ValidationError> for AssessmentError {
    fn from(err: ValidationError) -> Self {
        AssessmentError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("email");
        assert_eq!(format!("{}", err), "Field 'email' cannot be empty");
    }

    #[test]
    fn validation_error_too_long_displays_correctly() {
        let err = ValidationError::too_long("content", 10, 12);
        assert_eq!(
            format!("{}", err),
            "Field 'content' exceeds 10 characters (got 12)"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SessionNotFound, "Session not found");
        assert_eq!(format!("{}", err), "[SESSION_NOT_FOUND] Session not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::database("boom").with_detail("table", "captured_inputs");
        assert_eq!(err.details.get("table"), Some(&"captured_inputs".to_string()));
    }

    #[test]
    fn invalid_topic_details_list_valid_ids() {
        let err = AssessmentError::InvalidTopic {
            domain: DomainArea::Market,
            topic_id: "made_up".to_string(),
            valid_topic_ids: vec!["market_size".to_string()],
        };

        assert_eq!(err.code(), ErrorCode::InvalidTopic);
        assert_eq!(err.details()["valid_topic_ids"][0], "market_size");
    }

    #[test]
    fn uncovered_topics_conflict_lists_missing_ids() {
        let err = AssessmentError::uncovered_topics(
            DomainArea::Product,
            vec!["product_roadmap".to_string()],
        );

        assert_eq!(err.code(), ErrorCode::StateConflict);
        assert_eq!(err.details()["missing_topic_ids"][0], "product_roadmap");
        assert!(err.to_string().contains("product"));
    }

    #[test]
    fn database_domain_error_maps_to_persistence() {
        let err: AssessmentError = DomainError::database("connection reset").into();
        assert!(matches!(err, AssessmentError::Persistence(_)));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::NoInputsCaptured), "NO_INPUTS_CAPTURED");
        assert_eq!(format!("{}", ErrorCode::NoResponse), "NO_RESPONSE");
    }
}

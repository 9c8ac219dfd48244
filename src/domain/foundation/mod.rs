//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the readiness assessment domain.

mod confidence_level;
mod domain_area;
mod errors;
mod ids;
mod percentage;
mod session_status;
mod timestamp;

pub use confidence_level::ConfidenceLevel;
pub use domain_area::DomainArea;
pub use errors::{AssessmentError, DomainError, ErrorCode, ValidationError};
pub use ids::{MessageId, SessionId};
pub use percentage::Percentage;
pub use session_status::SessionStatus;
pub use timestamp::Timestamp;

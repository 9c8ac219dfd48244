//! HTTP DTOs for assessment endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::session::CreateSessionResult;
use crate::domain::foundation::{AssessmentError, DomainArea, SessionStatus};
use crate::domain::registry::{Topic, TopicRegistry};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start an assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentRequest {
    pub email: String,
}

/// Request to resume an assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeAssessmentRequest {
    pub recovery_token: String,
}

/// Frames a client may send over the turn socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SendMessage { content: String },
    Ping,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for a newly created assessment. The recovery token is shown once.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssessmentResponse {
    pub session_id: String,
    pub recovery_token: String,
    pub current_domain: DomainArea,
    pub status: SessionStatus,
    pub expires_at: String,
}

impl From<CreateSessionResult> for CreateAssessmentResponse {
    fn from(result: CreateSessionResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
            recovery_token: result.recovery_token,
            current_domain: result.current_domain,
            status: result.status,
            expires_at: result.expires_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for abandonment.
#[derive(Debug, Clone, Serialize)]
pub struct AbandonResponse {
    pub session_id: String,
    pub status: SessionStatus,
}

/// Server keep-alive reply.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: String,
}

/// One registry topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicResponse {
    pub id: &'static str,
    pub label: &'static str,
    pub requirements: &'static [&'static str],
    pub critical: bool,
}

impl From<&Topic> for TopicResponse {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id,
            label: topic.label,
            requirements: topic.requirements,
            critical: topic.critical,
        }
    }
}

/// One domain of the catalogue, in interview order.
#[derive(Debug, Clone, Serialize)]
pub struct DomainCatalogue {
    pub domain: DomainArea,
    pub label: &'static str,
    pub topics: Vec<TopicResponse>,
}

/// The full registry.
#[derive(Debug, Clone, Serialize)]
pub struct TopicCatalogueResponse {
    pub domains: Vec<DomainCatalogue>,
    pub total_topics: usize,
}

impl TopicCatalogueResponse {
    pub fn from_registry(registry: &TopicRegistry) -> Self {
        let domains = DomainArea::ALL
            .iter()
            .map(|&domain| DomainCatalogue {
                domain,
                label: domain.label(),
                topics: registry
                    .topics_for(domain)
                    .iter()
                    .map(|topic| TopicResponse::from(*topic))
                    .collect(),
            })
            .collect();
        Self {
            domains,
            total_topics: registry.total_topics(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&AssessmentError> for ErrorResponse {
    fn from(error: &AssessmentError) -> Self {
        let details = error.details();
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            details: (!details.is_null()).then_some(details),
        }
    }
}

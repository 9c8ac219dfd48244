//! Turn events - the ordered stream a single dialogue turn produces.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConfidenceLevel, DomainArea, ErrorCode, SessionId, SessionStatus};

/// One event of a turn stream.
///
/// Events are strictly ordered. Every turn ends with exactly one `Complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A fragment of assistant text.
    TextChunk { delta: String },

    /// A capture call was applied to the ledger.
    InputCaptured {
        domain: DomainArea,
        topic_id: String,
        confidence_level: ConfidenceLevel,
    },

    /// The session left a domain. `to` is `None` after the last domain.
    DomainChanged {
        from: DomainArea,
        to: Option<DomainArea>,
        assessment_complete: bool,
    },

    /// A tool call was refused and nothing was written. `details` carries
    /// what the assistant needs to retry, such as valid or missing topic ids.
    ToolRejected {
        tool: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic_id: Option<String>,
        error_code: String,
        message: String,
        #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
        details: serde_json::Value,
    },

    /// A turn-level failure. Always followed by `Complete`.
    Error { code: String, message: String },

    /// Terminal event with the session state after the turn.
    Complete {
        session_id: SessionId,
        current_domain: DomainArea,
        status: SessionStatus,
        topics_covered: usize,
    },
}

impl TurnEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        TurnEvent::TextChunk {
            delta: delta.into(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        TurnEvent::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for the closing event.
    pub fn is_complete(&self) -> bool {
        matches!(self, TurnEvent::Complete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_snake_case() {
        let json = serde_json::to_value(TurnEvent::InputCaptured {
            domain: DomainArea::GoToMarket,
            topic_id: "pricing_strategy".to_string(),
            confidence_level: ConfidenceLevel::Medium,
        })
        .unwrap();

        assert_eq!(json["type"], "input_captured");
        assert_eq!(json["domain"], "go_to_market");
        assert_eq!(json["confidence_level"], "medium");
    }

    #[test]
    fn error_uses_screaming_code() {
        let json = serde_json::to_value(TurnEvent::error(ErrorCode::NoResponse, "silent")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "NO_RESPONSE");
    }

    #[test]
    fn rejection_carries_structured_details() {
        let json = serde_json::to_value(TurnEvent::ToolRejected {
            tool: "transition_domain".to_string(),
            topic_id: None,
            error_code: "STATE_CONFLICT".to_string(),
            message: "Cannot leave market".to_string(),
            details: serde_json::json!({ "missing_topic_ids": ["market_size"] }),
        })
        .unwrap();

        assert_eq!(json["type"], "tool_rejected");
        assert!(json.get("topic_id").is_none());
        assert_eq!(json["details"]["missing_topic_ids"][0], "market_size");
    }

    #[test]
    fn completion_after_last_domain_has_no_target() {
        let json = serde_json::to_value(TurnEvent::DomainChanged {
            from: DomainArea::Financials,
            to: None,
            assessment_complete: true,
        })
        .unwrap();
        assert!(json["to"].is_null());
    }
}

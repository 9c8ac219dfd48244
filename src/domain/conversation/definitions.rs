//! Assessment tools - the two operations the dialogue delegate may call.
//!
//! Parameters are parsed from untrusted JSON and re-validated on every call.

use serde::{Deserialize, Serialize};

use super::ToolDefinition;
use crate::domain::foundation::{
    AssessmentError, ConfidenceLevel, DomainArea, SessionStatus,
};

pub const CAPTURE_INPUT: &str = "capture_input";
pub const TRANSITION_DOMAIN: &str = "transition_domain";

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Parameters for recording an answer to one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureInputParams {
    pub topic_id: String,
    pub response: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_insight: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    /// Interviewer's own read of the evidence; skips classification.
    #[serde(default)]
    pub confidence_hint: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl CaptureInputParams {
    /// Parses and checks required fields.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed JSON or a blank topic id or response
    pub fn parse(parameters: &serde_json::Value) -> Result<Self, AssessmentError> {
        let params: Self = serde_json::from_value(parameters.clone())
            .map_err(|e| AssessmentError::validation("parameters", e.to_string()))?;
        if params.topic_id.trim().is_empty() {
            return Err(AssessmentError::validation("topic_id", "topic_id is required"));
        }
        if params.response.trim().is_empty() {
            return Err(AssessmentError::validation("response", "response is required"));
        }
        Ok(params)
    }

    /// The hint as a label. Unrecognised values count as absent.
    pub fn hint(&self) -> Option<ConfidenceLevel> {
        self.confidence_hint.as_deref().and_then(|h| h.parse().ok())
    }
}

/// Parameters for closing the current domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDomainParams {
    #[serde(default)]
    pub domain_summary: String,
}

impl TransitionDomainParams {
    pub fn parse(parameters: &serde_json::Value) -> Result<Self, AssessmentError> {
        if parameters.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(parameters.clone())
            .map_err(|e| AssessmentError::validation("parameters", e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Results
// ═══════════════════════════════════════════════════════════════════════════

/// Result of a successful capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureInputResult {
    pub topic_id: String,
    pub domain: DomainArea,
    pub confidence_level: ConfidenceLevel,
    pub confidence_rationale: String,
    /// Topics of the current domain still without an answer.
    pub remaining_topic_ids: Vec<String>,
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDomainResult {
    pub from: DomainArea,
    pub to: Option<DomainArea>,
    pub assessment_complete: bool,
    pub status: SessionStatus,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the capture_input tool definition.
pub fn capture_input_tool() -> ToolDefinition {
    ToolDefinition::new(
        CAPTURE_INPUT,
        "Record the user's answer for one topic of the current domain. Call once per topic as soon as the user has answered it; calling again for the same topic replaces the earlier answer.",
        serde_json::json!({
            "type": "object",
            "required": ["topic_id", "response", "summary", "key_insight", "strengths", "considerations"],
            "properties": {
                "topic_id": {
                    "type": "string",
                    "description": "Id of a topic in the current domain (e.g., 'market_size')"
                },
                "response": {
                    "type": "string",
                    "description": "The user's answer in their own words"
                },
                "summary": {
                    "type": "string",
                    "description": "One-sentence summary of the answer"
                },
                "key_insight": {
                    "type": "string",
                    "description": "The most decision-relevant point in the answer"
                },
                "strengths": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "considerations": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "confidence_hint": {
                    "type": "string",
                    "enum": ["high", "medium", "low"],
                    "description": "HIGH = specific or validated, MEDIUM = reasonable estimate, LOW = assumption. Omit when unsure."
                },
                "rationale": {
                    "type": "string",
                    "description": "Why the confidence hint applies"
                }
            }
        }),
    )
}

/// Creates the transition_domain tool definition.
pub fn transition_domain_tool() -> ToolDefinition {
    ToolDefinition::new(
        TRANSITION_DOMAIN,
        "Close the current domain and move to the next one. Only succeeds once every topic of the current domain has been captured; otherwise the missing topic ids are returned.",
        serde_json::json!({
            "type": "object",
            "required": ["domain_summary"],
            "properties": {
                "domain_summary": {
                    "type": "string",
                    "description": "Two or three sentences summarising what was learned in this domain"
                }
            }
        }),
    )
}

/// All tools offered during a turn.
pub fn assessment_tools() -> Vec<ToolDefinition> {
    vec![capture_input_tool(), transition_domain_tool()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn capture_params_parse_with_defaults() {
        let params = CaptureInputParams::parse(&serde_json::json!({
            "topic_id": "market_size",
            "response": "About 2M clinics",
            "confidence_hint": "HIGH"
        }))
        .unwrap();

        assert!(params.summary.is_empty());
        assert!(params.strengths.is_empty());
        assert_eq!(params.hint(), Some(ConfidenceLevel::High));
    }

    #[test]
    fn unknown_hint_counts_as_absent() {
        let params = CaptureInputParams::parse(&serde_json::json!({
            "topic_id": "market_size",
            "response": "x",
            "confidence_hint": "certain"
        }))
        .unwrap();
        assert_eq!(params.hint(), None);
    }

    #[test]
    fn capture_params_require_topic_and_response() {
        let err = CaptureInputParams::parse(&serde_json::json!({ "topic_id": "", "response": "x" }))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        assert!(CaptureInputParams::parse(&serde_json::json!({ "topic_id": "market_size" })).is_err());
    }

    #[test]
    fn transition_params_tolerate_null() {
        assert_eq!(
            TransitionDomainParams::parse(&serde_json::Value::Null).unwrap(),
            TransitionDomainParams::default()
        );
    }

    #[test]
    fn both_tools_are_offered() {
        let names: Vec<_> = assessment_tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec![CAPTURE_INPUT, TRANSITION_DOMAIN]);
    }
}

//! Assessment behaviour settings

use serde::Deserialize;

use super::error::ValidationError;

/// Tunables for sessions, turns and annotation fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    /// Prior messages replayed to the dialogue delegate per turn
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,

    /// Characters kept when annotations fall back to the raw response
    #[serde(default = "default_annotation_fallback_chars")]
    pub annotation_fallback_chars: usize,

    /// Upper bound on a single user message
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl AssessmentConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=365).contains(&self.session_ttl_days) {
            return Err(ValidationError::AssessmentOutOfRange("session_ttl_days"));
        }
        if self.max_history_messages == 0 {
            return Err(ValidationError::AssessmentOutOfRange("max_history_messages"));
        }
        if self.annotation_fallback_chars == 0 {
            return Err(ValidationError::AssessmentOutOfRange(
                "annotation_fallback_chars",
            ));
        }
        if self.max_message_chars == 0 {
            return Err(ValidationError::AssessmentOutOfRange("max_message_chars"));
        }
        Ok(())
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            max_history_messages: default_max_history_messages(),
            annotation_fallback_chars: default_annotation_fallback_chars(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_session_ttl_days() -> i64 {
    30
}

fn default_max_history_messages() -> usize {
    20
}

fn default_annotation_fallback_chars() -> usize {
    200
}

fn default_max_message_chars() -> usize {
    10_000
}

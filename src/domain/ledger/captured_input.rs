//! CapturedInput - one ledger row per (session, topic).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConfidenceLevel, DomainArea, SessionId, Timestamp};

use super::InputAnnotations;

/// A captured answer for one topic of one session.
///
/// The pair (`session_id`, `topic_id`) is unique; re-answering overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedInput {
    pub session_id: SessionId,
    pub domain: DomainArea,
    pub topic_id: String,
    pub response: String,
    pub annotations: InputAnnotations,
    pub confidence_level: ConfidenceLevel,
    pub confidence_rationale: String,
    /// First capture time; fixes the row's position in insertion order.
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CapturedInput {
    /// Creates a new row stamped with the current time.
    pub fn new(
        session_id: SessionId,
        domain: DomainArea,
        topic_id: impl Into<String>,
        response: impl Into<String>,
        confidence_level: ConfidenceLevel,
        confidence_rationale: impl Into<String>,
        annotations: InputAnnotations,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            domain,
            topic_id: topic_id.into(),
            response: response.into(),
            annotations,
            confidence_level,
            confidence_rationale: confidence_rationale.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `other` targets the same ledger key.
    pub fn same_key(&self, other: &CapturedInput) -> bool {
        self.session_id == other.session_id && self.topic_id == other.topic_id
    }

    /// Overwrites this row with a newer answer, keeping its original
    /// `created_at`.
    pub fn overwrite_with(&mut self, newer: CapturedInput) {
        let created_at = self.created_at;
        *self = newer;
        self.created_at = created_at;
    }
}

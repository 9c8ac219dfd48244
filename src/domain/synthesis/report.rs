//! ReadinessReport - the persisted result of synthesis.

use serde::{Deserialize, Serialize};

use super::engine::ReadinessAssessment;
use super::narrative::Narrative;
use crate::domain::foundation::{SessionId, Timestamp};

/// Deterministic verdicts plus the advisory narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub assessment: ReadinessAssessment,
    pub narrative: Narrative,
    pub generated_at: Timestamp,
}

impl ReadinessReport {
    pub fn new(session_id: SessionId, assessment: ReadinessAssessment, narrative: Narrative) -> Self {
        Self {
            session_id,
            assessment,
            narrative,
            generated_at: Timestamp::now(),
        }
    }
}

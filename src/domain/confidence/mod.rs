//! Confidence classification - value types and the pattern tier.
//!
//! The full hybrid classifier (hint, pattern, delegate) lives in the
//! application layer; everything here is pure and synchronous.

mod patterns;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ConfidenceLevel;

pub use patterns::{classify_by_pattern, PatternTier};

/// Rationale used when a hint arrives without one.
pub const HINT_RATIONALE: &str = "Confidence supplied by interviewer";

/// Rationale used when the delegate could not classify.
pub const UNAVAILABLE_RATIONALE: &str =
    "Classifier unavailable; defaulted to a reasonable-estimate rating";

/// Which tier produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Hint,
    Pattern,
    Delegate,
    Fallback,
}

/// A confidence label with its rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub level: ConfidenceLevel,
    pub rationale: String,
    pub source: ClassificationSource,
}

impl Classification {
    /// Creates a classification, replacing a blank rationale with the
    /// label's default.
    pub fn new(
        level: ConfidenceLevel,
        rationale: impl Into<String>,
        source: ClassificationSource,
    ) -> Self {
        let rationale = rationale.into();
        let rationale = if rationale.trim().is_empty() {
            default_rationale(level).to_string()
        } else {
            rationale.trim().to_string()
        };
        Self {
            level,
            rationale,
            source,
        }
    }

    /// Interviewer-supplied label.
    pub fn from_hint(level: ConfidenceLevel, rationale: Option<&str>) -> Self {
        let rationale = rationale
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(HINT_RATIONALE);
        Self::new(level, rationale, ClassificationSource::Hint)
    }

    /// Degraded result when the delegate fails or answers off-schema.
    pub fn unavailable() -> Self {
        Self::new(
            ConfidenceLevel::Medium,
            UNAVAILABLE_RATIONALE,
            ClassificationSource::Fallback,
        )
    }
}

/// Default rationale per label.
pub fn default_rationale(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "Specific or validated evidence",
        ConfidenceLevel::Medium => "Reasonable estimate based on experience",
        ConfidenceLevel::Low => "Assumption that has not been validated",
    }
}

//! Ordinal verdicts produced by the readiness engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the ledger holds enough coverage to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Incomplete,
    Assessable,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Incomplete => "incomplete",
            AssessmentStatus::Assessable => "assessable",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall three-value verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Ready,
    ReadyWithCaveats,
    NotReady,
}

impl ReadinessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLevel::Ready => "ready",
            ReadinessLevel::ReadyWithCaveats => "ready_with_caveats",
            ReadinessLevel::NotReady => "not_ready",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Five-tier maturity ordinal, most favourable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionPositioning {
    PrimeForExpansion,
    ExpansionCandidate,
    ConditionalExpansion,
    BuildFoundation,
    NotPositioned,
}

impl ExpansionPositioning {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionPositioning::PrimeForExpansion => "prime_for_expansion",
            ExpansionPositioning::ExpansionCandidate => "expansion_candidate",
            ExpansionPositioning::ConditionalExpansion => "conditional_expansion",
            ExpansionPositioning::BuildFoundation => "build_foundation",
            ExpansionPositioning::NotPositioned => "not_positioned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpansionPositioning::PrimeForExpansion => "Prime for Expansion",
            ExpansionPositioning::ExpansionCandidate => "Expansion Candidate",
            ExpansionPositioning::ConditionalExpansion => "Conditional Expansion",
            ExpansionPositioning::BuildFoundation => "Build Foundation",
            ExpansionPositioning::NotPositioned => "Not Positioned",
        }
    }
}

impl fmt::Display for ExpansionPositioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thresholds a tier must satisfy. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositioningThreshold {
    pub tier: ExpansionPositioning,
    pub min_majority_high: usize,
    pub max_majority_low: usize,
    pub max_critical_items: usize,
    pub max_open_validations: Option<usize>,
}

/// Positioning tiers in evaluation order; `NotPositioned` is the fallback.
pub const POSITIONING_THRESHOLDS: [PositioningThreshold; 4] = [
    PositioningThreshold {
        tier: ExpansionPositioning::PrimeForExpansion,
        min_majority_high: 5,
        max_majority_low: 0,
        max_critical_items: 0,
        max_open_validations: Some(2),
    },
    PositioningThreshold {
        tier: ExpansionPositioning::ExpansionCandidate,
        min_majority_high: 4,
        max_majority_low: 0,
        max_critical_items: 1,
        max_open_validations: Some(5),
    },
    PositioningThreshold {
        tier: ExpansionPositioning::ConditionalExpansion,
        min_majority_high: 3,
        max_majority_low: 1,
        max_critical_items: 2,
        max_open_validations: Some(8),
    },
    PositioningThreshold {
        tier: ExpansionPositioning::BuildFoundation,
        min_majority_high: 1,
        max_majority_low: 2,
        max_critical_items: 4,
        max_open_validations: None,
    },
];

impl PositioningThreshold {
    pub fn is_satisfied(
        &self,
        majority_high: usize,
        majority_low: usize,
        critical_items: usize,
        open_validations: usize,
    ) -> bool {
        majority_high >= self.min_majority_high
            && majority_low <= self.max_majority_low
            && critical_items <= self.max_critical_items
            && self
                .max_open_validations
                .map_or(true, |max| open_validations <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_ordered_most_favourable_first() {
        let tiers: Vec<_> = POSITIONING_THRESHOLDS.iter().map(|t| t.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
    }

    #[test]
    fn unbounded_validations_accept_any_count() {
        let build = POSITIONING_THRESHOLDS[3];
        assert!(build.is_satisfied(1, 2, 4, 1_000));
        assert!(!build.is_satisfied(0, 0, 0, 0));
    }

    #[test]
    fn verdicts_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReadinessLevel::ReadyWithCaveats).unwrap(),
            "\"ready_with_caveats\""
        );
        assert_eq!(
            serde_json::to_string(&ExpansionPositioning::PrimeForExpansion).unwrap(),
            "\"prime_for_expansion\""
        );
    }
}

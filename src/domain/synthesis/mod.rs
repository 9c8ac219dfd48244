//! Readiness Synthesis - from a ledger snapshot to a report.
//!
//! [`ReadinessEngine::assess`] is pure and reproducible. The narrative is
//! advisory and cannot change any verdict.

mod engine;
mod levels;
mod narrative;
mod report;

pub use engine::{
    ConfidenceBreakdown, DomainAssessment, ReadinessAssessment, ReadinessEngine, ReadinessSignals,
    MIN_COVERAGE_PERCENT, MIN_TOPICS_PER_DOMAIN,
};
pub use levels::{
    AssessmentStatus, ExpansionPositioning, PositioningThreshold, ReadinessLevel,
    POSITIONING_THRESHOLDS,
};
pub use narrative::{Narrative, NarrativeItem, NarrativeSchema, ParsedNarrative};
pub use report::ReadinessReport;

//! Readiness Engine - deterministic scoring over a ledger snapshot.
//!
//! Everything here is a pure function of the captured inputs. Annotations
//! and narrative text never enter the computation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::levels::{
    AssessmentStatus, ExpansionPositioning, ReadinessLevel, POSITIONING_THRESHOLDS,
};
use crate::domain::foundation::{ConfidenceLevel, DomainArea, Percentage};
use crate::domain::ledger::CapturedInput;
use crate::domain::registry::TopicRegistry;

/// Minimum overall coverage for an assessable report.
pub const MIN_COVERAGE_PERCENT: u8 = 60;

/// Minimum covered topics every domain needs for an assessable report.
pub const MIN_TOPICS_PER_DOMAIN: usize = 2;

const HIGH_RATIO_FOR_HIGH: f64 = 0.6;
const HIGH_RATIO_FOR_MEDIUM: f64 = 0.4;
const MEDIUM_RATIO_FOR_MEDIUM: f64 = 0.6;

/// Counts of each confidence label within a domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceBreakdown {
    fn record(&mut self, level: ConfidenceLevel) {
        match level {
            ConfidenceLevel::High => self.high += 1,
            ConfidenceLevel::Medium => self.medium += 1,
            ConfidenceLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    /// More than half of the inputs are high.
    pub fn is_majority_high(&self) -> bool {
        self.total() > 0 && self.high * 2 > self.total()
    }

    /// More than half of the inputs are low.
    pub fn is_majority_low(&self) -> bool {
        self.total() > 0 && self.low * 2 > self.total()
    }

    /// Aggregate label for the domain. Empty domains are low.
    pub fn level(&self) -> ConfidenceLevel {
        let total = self.total();
        if total == 0 {
            return ConfidenceLevel::Low;
        }
        let high_ratio = self.high as f64 / total as f64;
        let medium_ratio = self.medium as f64 / total as f64;
        if high_ratio >= HIGH_RATIO_FOR_HIGH {
            ConfidenceLevel::High
        } else if high_ratio >= HIGH_RATIO_FOR_MEDIUM || medium_ratio >= MEDIUM_RATIO_FOR_MEDIUM {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Per-domain aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAssessment {
    pub domain: DomainArea,
    pub topics_covered: usize,
    pub topics_total: usize,
    pub confidence_level: ConfidenceLevel,
    pub confidence_breakdown: ConfidenceBreakdown,
}

/// Ledger-derived counts feeding the verdicts.
///
/// Lists hold domains or topic ids in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSignals {
    pub majority_high_domains: Vec<DomainArea>,
    pub majority_low_domains: Vec<DomainArea>,
    /// Critical topics that are uncovered or low confidence.
    pub critical_items: Vec<String>,
    /// Low-confidence inputs on non-critical topics.
    pub open_assumptions: Vec<String>,
    /// Open assumptions plus every medium-confidence input.
    pub open_validations: Vec<String>,
    /// Covered domains without a single high-confidence input.
    pub domains_without_high: Vec<DomainArea>,
}

/// The deterministic part of a readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub assessment_status: AssessmentStatus,
    pub coverage_percentage: Percentage,
    pub topics_covered: usize,
    pub topics_total: usize,
    pub domains: Vec<DomainAssessment>,
    /// Domains below the per-domain coverage minimum.
    pub under_covered_domains: Vec<DomainArea>,
    pub signals: ReadinessSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_level: Option<ReadinessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion_positioning: Option<ExpansionPositioning>,
}

impl ReadinessAssessment {
    pub fn is_assessable(&self) -> bool {
        self.assessment_status == AssessmentStatus::Assessable
    }

    pub fn domain(&self, domain: DomainArea) -> Option<&DomainAssessment> {
        self.domains.iter().find(|d| d.domain == domain)
    }
}

/// Pure readiness scoring service.
pub struct ReadinessEngine;

impl ReadinessEngine {
    /// Scores a ledger snapshot.
    ///
    /// Inputs whose topic is not registered for their domain are ignored.
    /// If a topic appears twice, the most recently updated row counts.
    pub fn assess(inputs: &[CapturedInput]) -> ReadinessAssessment {
        let registry = TopicRegistry::global();
        let latest = Self::latest_per_topic(inputs);

        let mut domains = Vec::with_capacity(DomainArea::ALL.len());
        let mut signals = ReadinessSignals::default();

        for domain in DomainArea::ALL {
            let mut breakdown = ConfidenceBreakdown::default();
            for topic in registry.topics_for(domain) {
                let level = latest.get(topic.id).map(|i| i.confidence_level);
                if let Some(level) = level {
                    breakdown.record(level);
                }
                match (level, topic.critical) {
                    (None, true) | (Some(ConfidenceLevel::Low), true) => {
                        signals.critical_items.push(topic.id.to_string());
                    }
                    (Some(ConfidenceLevel::Low), false) => {
                        signals.open_assumptions.push(topic.id.to_string());
                        signals.open_validations.push(topic.id.to_string());
                    }
                    (Some(ConfidenceLevel::Medium), _) => {
                        signals.open_validations.push(topic.id.to_string());
                    }
                    _ => {}
                }
            }

            if breakdown.is_majority_high() {
                signals.majority_high_domains.push(domain);
            }
            if breakdown.is_majority_low() {
                signals.majority_low_domains.push(domain);
            }
            if breakdown.total() > 0 && breakdown.high == 0 {
                signals.domains_without_high.push(domain);
            }

            domains.push(DomainAssessment {
                domain,
                topics_covered: breakdown.total(),
                topics_total: registry.topics_for(domain).len(),
                confidence_level: breakdown.level(),
                confidence_breakdown: breakdown,
            });
        }

        let topics_total = registry.total_topics();
        let topics_covered = latest.len();
        let coverage_percentage = Percentage::of(topics_covered, topics_total);
        let under_covered_domains: Vec<DomainArea> = domains
            .iter()
            .filter(|d| d.topics_covered < MIN_TOPICS_PER_DOMAIN)
            .map(|d| d.domain)
            .collect();

        let assessment_status = if coverage_percentage.value() < MIN_COVERAGE_PERCENT
            || !under_covered_domains.is_empty()
        {
            AssessmentStatus::Incomplete
        } else {
            AssessmentStatus::Assessable
        };

        let (readiness_level, expansion_positioning) = match assessment_status {
            AssessmentStatus::Assessable => (
                Some(Self::determine_readiness(&signals)),
                Some(Self::determine_positioning(&signals)),
            ),
            AssessmentStatus::Incomplete => (None, None),
        };

        ReadinessAssessment {
            assessment_status,
            coverage_percentage,
            topics_covered,
            topics_total,
            domains,
            under_covered_domains,
            signals,
            readiness_level,
            expansion_positioning,
        }
    }

    /// Readiness precedence: not_ready, then ready, then ready_with_caveats.
    pub fn determine_readiness(signals: &ReadinessSignals) -> ReadinessLevel {
        if signals.majority_low_domains.len() >= 2
            || signals.critical_items.len() >= 3
            || !signals.domains_without_high.is_empty()
        {
            return ReadinessLevel::NotReady;
        }
        if signals.majority_high_domains.len() >= 4
            && signals.critical_items.is_empty()
            && signals.open_assumptions.len() <= 2
        {
            return ReadinessLevel::Ready;
        }
        ReadinessLevel::ReadyWithCaveats
    }

    /// First satisfied positioning tier, else `NotPositioned`.
    pub fn determine_positioning(signals: &ReadinessSignals) -> ExpansionPositioning {
        POSITIONING_THRESHOLDS
            .iter()
            .find(|t| {
                t.is_satisfied(
                    signals.majority_high_domains.len(),
                    signals.majority_low_domains.len(),
                    signals.critical_items.len(),
                    signals.open_validations.len(),
                )
            })
            .map(|t| t.tier)
            .unwrap_or(ExpansionPositioning::NotPositioned)
    }

    fn latest_per_topic(inputs: &[CapturedInput]) -> BTreeMap<&str, &CapturedInput> {
        let registry = TopicRegistry::global();
        let mut latest: BTreeMap<&str, &CapturedInput> = BTreeMap::new();
        for input in inputs
            .iter()
            .filter(|i| registry.is_member(i.domain, &i.topic_id))
        {
            match latest.get(input.topic_id.as_str()) {
                Some(existing) if existing.updated_at.is_after(&input.updated_at) => {}
                _ => {
                    latest.insert(input.topic_id.as_str(), input);
                }
            }
        }
        latest
    }
}

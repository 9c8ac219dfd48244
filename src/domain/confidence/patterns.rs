//! Pattern tier of the confidence classifier.
//!
//! Tiers are checked low, then high, then medium. Hedging language wins over
//! any number in the same answer.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::{Classification, ClassificationSource};
use crate::domain::foundation::ConfidenceLevel;

/// A group of phrases that map to one confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternTier {
    Hedge,
    Evidence,
    Experience,
}

impl PatternTier {
    pub fn level(&self) -> ConfidenceLevel {
        match self {
            PatternTier::Hedge => ConfidenceLevel::Low,
            PatternTier::Evidence => ConfidenceLevel::High,
            PatternTier::Experience => ConfidenceLevel::Medium,
        }
    }
}

impl fmt::Display for PatternTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternTier::Hedge => "hedging language",
            PatternTier::Evidence => "specific evidence",
            PatternTier::Experience => "experience-based estimate",
        };
        write!(f, "{}", s)
    }
}

struct CompiledTier {
    tier: PatternTier,
    patterns: Vec<Regex>,
}

const HEDGE_PATTERNS: &[&str] = &[
    r"(?i)\b(i|we) (think|believe|hope|guess|assume|feel)\b",
    r"(?i)\b(might|maybe|perhaps|possibly|probably|hopefully)\b",
    r"(?i)\b(not sure|unsure|no idea|unclear|don'?t know|haven'?t (yet )?(validated|tested|checked))\b",
    r"(?i)\b(assum(e|es|ed|ing|ption|ptions)|should work|in theory)\b",
];

const EVIDENCE_PATTERNS: &[&str] = &[
    r"(?i)\b\d[\d,.]*\s*(k|m)?\s*(paying )?(customers|users|clients|accounts|subscribers|units|orders|employees|contracts|stores|locations)\b",
    r"[$€£]\s?\d",
    r"\b\d+(\.\d+)?\s?%",
    r"(?i)\b(signed|contracted|closed|audited|certified|validated with|letters? of intent|lois?)\b",
    r"(?i)\b(by|in|since) (q[1-4]|january|february|march|april|may|june|july|august|september|october|november|december|(19|20)\d{2})\b",
];

const EXPERIENCE_PATTERNS: &[&str] = &[
    r"(?i)\b(experience|pilot|pilots|trial|trials|estimate|estimated|roughly|approximately|around|about)\b",
    r"(?i)\b(similar|comparable|benchmark|industry average|typically|usually|expect|expected)\b",
];

static TIERS: Lazy<Vec<CompiledTier>> = Lazy::new(|| {
    [
        (PatternTier::Hedge, HEDGE_PATTERNS),
        (PatternTier::Evidence, EVIDENCE_PATTERNS),
        (PatternTier::Experience, EXPERIENCE_PATTERNS),
    ]
    .into_iter()
    .map(|(tier, sources)| CompiledTier {
        tier,
        // Constant sources; an invalid one is skipped rather than aborting.
        patterns: sources.iter().filter_map(|p| Regex::new(p).ok()).collect(),
    })
    .collect()
});

/// Classifies by fixed phrase patterns.
///
/// Returns `None` when no tier matches, leaving the decision to the delegate.
pub fn classify_by_pattern(text: &str) -> Option<Classification> {
    TIERS.iter().find_map(|compiled| {
        compiled
            .patterns
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| {
                Classification::new(
                    compiled.tier.level(),
                    format!("Matched {}: \"{}\"", compiled.tier, m.as_str().trim()),
                    ClassificationSource::Pattern,
                )
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn level(text: &str) -> Option<ConfidenceLevel> {
        classify_by_pattern(text).map(|c| c.level)
    }

    #[test]
    fn every_pattern_compiles() {
        let total: usize = TIERS.iter().map(|t| t.patterns.len()).sum();
        assert_eq!(
            total,
            HEDGE_PATTERNS.len() + EVIDENCE_PATTERNS.len() + EXPERIENCE_PATTERNS.len()
        );
    }

    #[test]
    fn paying_customers_is_high() {
        assert_eq!(level("We have 340 paying customers"), Some(ConfidenceLevel::High));
    }

    #[test]
    fn hedged_belief_is_low() {
        assert_eq!(level("We think it might work"), Some(ConfidenceLevel::Low));
    }

    #[test]
    fn pilot_experience_is_medium() {
        assert_eq!(
            level("Based on our experience with similar pilots"),
            Some(ConfidenceLevel::Medium)
        );
    }

    #[test]
    fn hedge_overrides_numbers() {
        assert_eq!(
            level("We think we could reach 40% margins"),
            Some(ConfidenceLevel::Low)
        );
    }

    #[test]
    fn currency_and_dates_are_high() {
        assert_eq!(level("ARR is $1.2M"), Some(ConfidenceLevel::High));
        assert_eq!(level("Launch is committed by Q3"), Some(ConfidenceLevel::High));
    }

    #[test]
    fn rationale_names_tier_and_phrase() {
        let c = classify_by_pattern("Maybe next year").unwrap();
        assert!(c.rationale.contains("hedging language"));
        assert!(c.rationale.contains("Maybe"));
    }

    #[test]
    fn plain_text_has_no_pattern() {
        assert_eq!(level("Our product helps clinics schedule staff"), None);
        assert_eq!(level(""), None);
    }

    proptest! {
        #[test]
        fn pattern_tier_never_panics(text in ".{0,200}") {
            if let Some(c) = classify_by_pattern(&text) {
                prop_assert!(!c.rationale.is_empty());
            }
        }
    }
}

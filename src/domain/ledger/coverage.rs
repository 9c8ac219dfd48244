//! Coverage queries over a ledger snapshot.

use std::collections::HashSet;

use crate::domain::foundation::DomainArea;
use crate::domain::registry::TopicRegistry;

use super::CapturedInput;

/// Topic ids of `domain` that have a captured input, in registry order.
pub fn covered_topic_ids(inputs: &[CapturedInput], domain: DomainArea) -> Vec<String> {
    let captured = captured_set(inputs, domain);
    TopicRegistry::global()
        .topic_ids(domain)
        .into_iter()
        .filter(|id| captured.contains(id))
        .map(str::to_string)
        .collect()
}

/// Topic ids of `domain` still lacking an input, in registry order.
pub fn uncovered_topic_ids(inputs: &[CapturedInput], domain: DomainArea) -> Vec<String> {
    let captured = captured_set(inputs, domain);
    TopicRegistry::global()
        .topic_ids(domain)
        .into_iter()
        .filter(|id| !captured.contains(id))
        .map(str::to_string)
        .collect()
}

/// Number of distinct registered topics covered across all domains.
pub fn distinct_covered(inputs: &[CapturedInput]) -> usize {
    let registry = TopicRegistry::global();
    inputs
        .iter()
        .filter(|i| registry.is_member(i.domain, &i.topic_id))
        .map(|i| i.topic_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn captured_set(inputs: &[CapturedInput], domain: DomainArea) -> HashSet<&str> {
    inputs
        .iter()
        .filter(|i| i.domain == domain)
        .map(|i| i.topic_id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConfidenceLevel, SessionId};
    use crate::domain::ledger::InputAnnotations;

    fn input(domain: DomainArea, topic: &str) -> CapturedInput {
        CapturedInput::new(
            SessionId::new(),
            domain,
            topic,
            "answer",
            ConfidenceLevel::High,
            "specific",
            InputAnnotations::default(),
        )
    }

    #[test]
    fn uncovered_lists_missing_ids_in_registry_order() {
        let inputs = vec![
            input(DomainArea::Market, "market_timing"),
            input(DomainArea::Market, "target_customer"),
        ];

        assert_eq!(
            uncovered_topic_ids(&inputs, DomainArea::Market),
            vec!["market_size", "competitive_landscape", "customer_validation"]
        );
        assert_eq!(
            covered_topic_ids(&inputs, DomainArea::Market),
            vec!["target_customer", "market_timing"]
        );
    }

    #[test]
    fn distinct_covered_ignores_duplicates_and_foreign_ids() {
        let inputs = vec![
            input(DomainArea::Market, "market_size"),
            input(DomainArea::Market, "market_size"),
            input(DomainArea::Market, "invented_topic"),
            input(DomainArea::Product, "product_roadmap"),
        ];
        assert_eq!(distinct_covered(&inputs), 2);
    }
}

//! Topic Registry - the fixed catalogue of domains and topics.
//!
//! The registry is static data, not session state. It is built once on first
//! access and shared read-only for the lifetime of the process.
//!
//! # Example
//!
//! ```
//! use expansion_readiness::domain::foundation::DomainArea;
//! use expansion_readiness::domain::registry::TopicRegistry;
//!
//! let registry = TopicRegistry::global();
//! assert_eq!(registry.total_topics(), 25);
//! assert!(registry.is_member(DomainArea::Market, "market_size"));
//! assert!(!registry.is_member(DomainArea::Product, "market_size"));
//! ```

mod catalogue;

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::foundation::DomainArea;

/// Number of topics every domain owns.
pub const TOPICS_PER_DOMAIN: usize = 5;

/// A fixed interview sub-question within a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub label: &'static str,
    pub domain: DomainArea,
    /// What a complete answer should establish.
    pub requirements: &'static [&'static str],
    /// Uncovered or low-confidence critical topics count as critical items.
    pub critical: bool,
}

/// Immutable lookup over the topic catalogue.
#[derive(Debug)]
pub struct TopicRegistry {
    by_id: HashMap<&'static str, &'static Topic>,
    by_domain: HashMap<DomainArea, Vec<&'static Topic>>,
}

static REGISTRY: Lazy<TopicRegistry> = Lazy::new(|| TopicRegistry::from_topics(catalogue::TOPICS));

impl TopicRegistry {
    /// Returns the process-wide registry.
    pub fn global() -> &'static TopicRegistry {
        &REGISTRY
    }

    fn from_topics(topics: &'static [Topic]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_domain: HashMap<DomainArea, Vec<&'static Topic>> = HashMap::new();
        for topic in topics {
            by_id.insert(topic.id, topic);
            by_domain.entry(topic.domain).or_default().push(topic);
        }
        Self { by_id, by_domain }
    }

    /// Topics of a domain in catalogue order.
    pub fn topics_for(&self, domain: DomainArea) -> &[&'static Topic] {
        self.by_domain
            .get(&domain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Topic ids of a domain in catalogue order.
    pub fn topic_ids(&self, domain: DomainArea) -> Vec<&'static str> {
        self.topics_for(domain).iter().map(|t| t.id).collect()
    }

    /// Looks up a topic by id across all domains.
    pub fn topic(&self, topic_id: &str) -> Option<&'static Topic> {
        self.by_id.get(topic_id).copied()
    }

    /// Returns true if `topic_id` belongs to `domain`.
    pub fn is_member(&self, domain: DomainArea, topic_id: &str) -> bool {
        self.topic(topic_id).is_some_and(|t| t.domain == domain)
    }

    /// Total number of topics across all domains.
    pub fn total_topics(&self) -> usize {
        self.by_id.len()
    }

    /// All topics in interview order.
    pub fn all_topics(&self) -> Vec<&'static Topic> {
        DomainArea::ALL
            .iter()
            .flat_map(|d| self.topics_for(*d).iter().copied())
            .collect()
    }
}

//! DomainArea - the five ordered assessment domains.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five fixed top-level assessment categories.
///
/// Domains are interviewed in declaration order. `next()` has no cycle: the
/// last domain has no successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DomainArea {
    #[default]
    Market,
    Product,
    GoToMarket,
    Operations,
    Financials,
}

impl DomainArea {
    /// All domains in interview order.
    pub const ALL: [DomainArea; 5] = [
        DomainArea::Market,
        DomainArea::Product,
        DomainArea::GoToMarket,
        DomainArea::Operations,
        DomainArea::Financials,
    ];

    /// Returns the first domain of the interview.
    pub fn first() -> Self {
        DomainArea::Market
    }

    /// Returns the successor domain, or `None` for the last one.
    pub fn next(&self) -> Option<Self> {
        match self {
            DomainArea::Market => Some(DomainArea::Product),
            DomainArea::Product => Some(DomainArea::GoToMarket),
            DomainArea::GoToMarket => Some(DomainArea::Operations),
            DomainArea::Operations => Some(DomainArea::Financials),
            DomainArea::Financials => None,
        }
    }

    /// Returns true for the final domain.
    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Zero-based position in the interview order.
    pub fn index(&self) -> usize {
        match self {
            DomainArea::Market => 0,
            DomainArea::Product => 1,
            DomainArea::GoToMarket => 2,
            DomainArea::Operations => 3,
            DomainArea::Financials => 4,
        }
    }

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainArea::Market => "market",
            DomainArea::Product => "product",
            DomainArea::GoToMarket => "go_to_market",
            DomainArea::Operations => "operations",
            DomainArea::Financials => "financials",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DomainArea::Market => "Market",
            DomainArea::Product => "Product",
            DomainArea::GoToMarket => "Go-to-Market",
            DomainArea::Operations => "Operations",
            DomainArea::Financials => "Financials",
        }
    }
}

impl fmt::Display for DomainArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DomainArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainArea::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown domain: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_follows_interview_order() {
        assert_eq!(DomainArea::Market.next(), Some(DomainArea::Product));
        assert_eq!(DomainArea::Operations.next(), Some(DomainArea::Financials));
    }

    #[test]
    fn financials_has_no_successor() {
        assert_eq!(DomainArea::Financials.next(), None);
        assert!(DomainArea::Financials.is_last());
    }

    #[test]
    fn walking_successors_visits_every_domain_once() {
        let mut seen = vec![DomainArea::first()];
        while let Some(next) = seen.last().and_then(|d| d.next()) {
            seen.push(next);
        }
        assert_eq!(seen, DomainArea::ALL.to_vec());
    }

    #[test]
    fn ordering_matches_index() {
        for window in DomainArea::ALL.windows(2) {
            assert!(window[0] < window[1]);
            assert_eq!(window[0].index() + 1, window[1].index());
        }
    }

    #[test]
    fn parses_from_snake_case() {
        assert_eq!("go_to_market".parse::<DomainArea>().unwrap(), DomainArea::GoToMarket);
        assert!("sales".parse::<DomainArea>().is_err());
        assert_eq!(
            serde_json::to_string(&DomainArea::GoToMarket).unwrap(),
            "\"go_to_market\""
        );
    }
}

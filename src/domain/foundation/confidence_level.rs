//! ConfidenceLevel - how well-evidenced a captured answer is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-value evidence classification for a captured input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Specific, quantified or externally validated.
    High,
    /// Reasonable estimate grounded in experience.
    Medium,
    /// Assumption or unvalidated belief.
    Low,
}

impl ConfidenceLevel {
    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    /// Parses case-insensitively, so delegate output such as `"HIGH"` is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ConfidenceLevel::High),
            "medium" => Ok(ConfidenceLevel::Medium),
            "low" => Ok(ConfidenceLevel::Low),
            other => Err(format!("unknown confidence level: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("HIGH".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::High);
        assert_eq!(" Medium ".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Medium);
        assert!("certain".parse::<ConfidenceLevel>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConfidenceLevel::Low).unwrap(), "\"low\"");
    }
}

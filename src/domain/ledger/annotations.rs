//! Open-ended annotations extracted from an answer.
//!
//! Annotations are a string-keyed map so extraction can evolve without
//! schema changes. They never feed the readiness score.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SUMMARY: &str = "summary";
pub const KEY_INSIGHT: &str = "key_insight";
pub const STRENGTHS: &str = "strengths";
pub const CONSIDERATIONS: &str = "considerations";

/// Structured notes attached to a captured input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputAnnotations(BTreeMap<String, Value>);

impl InputAnnotations {
    /// Creates annotations from the four well-known fields.
    pub fn new(
        summary: impl Into<String>,
        key_insight: impl Into<String>,
        strengths: Vec<String>,
        considerations: Vec<String>,
    ) -> Self {
        let mut map = BTreeMap::new();
        map.insert(SUMMARY.to_string(), Value::String(summary.into()));
        map.insert(KEY_INSIGHT.to_string(), Value::String(key_insight.into()));
        map.insert(STRENGTHS.to_string(), Value::from(strengths));
        map.insert(CONSIDERATIONS.to_string(), Value::from(considerations));
        Self(map)
    }

    /// Fallback used when extraction fails: the summary is the raw response
    /// cut to `max_chars` characters.
    pub fn fallback(response: &str, max_chars: usize) -> Self {
        Self::new(truncate_chars(response, max_chars), "", Vec::new(), Vec::new())
    }

    /// Builds annotations from an arbitrary JSON object, keeping unknown keys.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.into_iter().collect())),
            _ => None,
        }
    }

    pub fn summary(&self) -> &str {
        self.text(SUMMARY)
    }

    pub fn key_insight(&self) -> &str {
        self.text(KEY_INSIGHT)
    }

    pub fn strengths(&self) -> Vec<String> {
        self.list(STRENGTHS)
    }

    pub fn considerations(&self) -> Vec<String> {
        self.list(CONSIDERATIONS)
    }

    /// Returns true when neither summary nor key insight carry text.
    pub fn is_blank(&self) -> bool {
        self.summary().trim().is_empty() && self.key_insight().trim().is_empty()
    }

    /// Returns a raw entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    fn text(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Truncates on a char boundary, appending an ellipsis when shortened.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

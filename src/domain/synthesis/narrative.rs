//! Advisory narrative sections attached to a report.
//!
//! The narrative is generated by the structured-output delegate. It is
//! parsed defensively: every item must carry domain and topic provenance that
//! exists in the registry, otherwise it is dropped.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::levels::AssessmentStatus;
use crate::domain::foundation::DomainArea;
use crate::domain::registry::TopicRegistry;

/// One narrative bullet tied back to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeItem {
    pub domain: DomainArea,
    pub topic_id: String,
    pub text: String,
}

/// Which section set the delegate is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSchema {
    /// Incomplete assessments: where to go next.
    Reduced,
    /// Assessable assessments: the full advisory write-up.
    Full,
}

impl NarrativeSchema {
    pub fn for_status(status: AssessmentStatus) -> Self {
        match status {
            AssessmentStatus::Incomplete => NarrativeSchema::Reduced,
            AssessmentStatus::Assessable => NarrativeSchema::Full,
        }
    }

    /// List sections requested under this schema.
    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            NarrativeSchema::Reduced => &["strengths", "gaps", "next_steps"],
            NarrativeSchema::Full => &[
                "strengths",
                "risks",
                "critical_actions",
                "assumptions",
                "roadmap",
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NarrativeSchema::Reduced => "record_partial_narrative",
            NarrativeSchema::Full => "record_readiness_narrative",
        }
    }

    /// JSON schema handed to the structured-output delegate.
    pub fn json_schema(&self) -> Value {
        let item = json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "enum": DomainArea::ALL.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                },
                "topic_id": { "type": "string" },
                "text": { "type": "string" }
            },
            "required": ["domain", "topic_id", "text"]
        });

        let mut properties = serde_json::Map::new();
        properties.insert("summary".to_string(), json!({ "type": "string" }));
        for section in self.sections() {
            properties.insert(
                section.to_string(),
                json!({ "type": "array", "items": item.clone() }),
            );
        }

        let mut required = vec!["summary"];
        required.extend(self.sections().iter().copied());

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Delegate-written narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_actions: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<NarrativeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roadmap: Vec<NarrativeItem>,
}

/// Result of parsing delegate output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNarrative {
    pub narrative: Narrative,
    /// Items discarded for missing or unknown provenance.
    pub dropped_items: usize,
}

impl Narrative {
    /// Parses delegate output under `schema`.
    ///
    /// Returns `None` when the output is not an object with a summary.
    /// Sections outside the schema are ignored.
    pub fn parse(value: &Value, schema: NarrativeSchema) -> Option<ParsedNarrative> {
        let summary = value.get("summary")?.as_str()?.trim().to_string();

        let mut narrative = Narrative {
            summary,
            ..Narrative::default()
        };
        let mut dropped_items = 0;

        for section in schema.sections() {
            let raw = value
                .get(*section)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let mut items = Vec::with_capacity(raw.len());
            for entry in raw {
                match parse_item(entry) {
                    Some(item) => items.push(item),
                    None => dropped_items += 1,
                }
            }
            if let Some(slot) = narrative.section_mut(section) {
                *slot = items;
            }
        }

        Some(ParsedNarrative {
            narrative,
            dropped_items,
        })
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        [
            &self.strengths,
            &self.gaps,
            &self.next_steps,
            &self.risks,
            &self.critical_actions,
            &self.assumptions,
            &self.roadmap,
        ]
        .iter()
        .map(|s| s.len())
        .sum()
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Vec<NarrativeItem>> {
        match name {
            "strengths" => Some(&mut self.strengths),
            "gaps" => Some(&mut self.gaps),
            "next_steps" => Some(&mut self.next_steps),
            "risks" => Some(&mut self.risks),
            "critical_actions" => Some(&mut self.critical_actions),
            "assumptions" => Some(&mut self.assumptions),
            "roadmap" => Some(&mut self.roadmap),
            _ => None,
        }
    }
}

fn parse_item(value: &Value) -> Option<NarrativeItem> {
    let domain: DomainArea = value.get("domain")?.as_str()?.parse().ok()?;
    let topic_id = value.get("topic_id")?.as_str()?.trim();
    let text = value.get("text")?.as_str()?.trim();
    if text.is_empty() || !TopicRegistry::global().is_member(domain, topic_id) {
        return None;
    }
    Some(NarrativeItem {
        domain,
        topic_id: topic_id.to_string(),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_follows_assessment_status() {
        assert_eq!(
            NarrativeSchema::for_status(AssessmentStatus::Incomplete),
            NarrativeSchema::Reduced
        );
        let schema = NarrativeSchema::Full.json_schema();
        assert!(schema["properties"]["roadmap"].is_object());
        assert!(schema["properties"]["gaps"].is_null());
    }

    #[test]
    fn items_with_unknown_provenance_are_dropped() {
        let output = json!({
            "summary": "Solid market work",
            "strengths": [
                { "domain": "market", "topic_id": "market_size", "text": "Sized bottom-up" },
                { "domain": "market", "topic_id": "cash_runway", "text": "Wrong domain" },
                { "domain": "space", "topic_id": "market_size", "text": "Unknown domain" },
                { "domain": "market", "topic_id": "market_timing" }
            ],
            "gaps": [],
            "next_steps": [
                { "domain": "financials", "topic_id": "cash_runway", "text": "Model runway" }
            ]
        });

        let parsed = Narrative::parse(&output, NarrativeSchema::Reduced).unwrap();

        assert_eq!(parsed.dropped_items, 3);
        assert_eq!(parsed.narrative.strengths.len(), 1);
        assert_eq!(parsed.narrative.next_steps[0].topic_id, "cash_runway");
        assert_eq!(parsed.narrative.item_count(), 2);
    }

    #[test]
    fn sections_outside_schema_are_ignored() {
        let output = json!({
            "summary": "Partial",
            "risks": [{ "domain": "market", "topic_id": "market_size", "text": "ignored" }]
        });
        let parsed = Narrative::parse(&output, NarrativeSchema::Reduced).unwrap();
        assert!(parsed.narrative.risks.is_empty());
    }

    #[test]
    fn missing_summary_is_rejected() {
        assert!(Narrative::parse(&json!({ "strengths": [] }), NarrativeSchema::Full).is_none());
        assert!(Narrative::parse(&json!("text"), NarrativeSchema::Full).is_none());
    }
}

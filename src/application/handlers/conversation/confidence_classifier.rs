//! Hybrid confidence classifier and annotation extraction.
//!
//! Tiers run in a fixed order: caller hint, regex patterns, then the
//! structured-output delegate. The classifier is total: any delegate failure
//! degrades to a medium rating instead of failing the capture.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::confidence::{classify_by_pattern, Classification, ClassificationSource};
use crate::domain::foundation::ConfidenceLevel;
use crate::domain::ledger::InputAnnotations;
use crate::domain::registry::Topic;
use crate::ports::{StructuredOutputProvider, StructuredRequest};

const CLASSIFY_NAME: &str = "record_confidence";
const EXTRACT_NAME: &str = "record_annotations";

const CLASSIFY_SYSTEM_PROMPT: &str = r#"You rate how well-founded a founder's answer is.

HIGH: specific or validated evidence (figures, signed customers, dated commitments, measured results).
MEDIUM: a reasonable estimate grounded in experience, pilots or comparable data.
LOW: an assumption, hope or plan that has not been validated.

Return exactly one level and a one-sentence rationale."#;

const EXTRACT_SYSTEM_PROMPT: &str = r#"You condense a founder's answer to an interview topic.

Return a one-sentence summary, the single most decision-relevant insight, and short lists of strengths and considerations drawn only from the answer."#;

/// Confidence classifier backed by a structured-output delegate.
#[derive(Clone)]
pub struct ConfidenceClassifier {
    delegate: Arc<dyn StructuredOutputProvider>,
}

impl ConfidenceClassifier {
    pub fn new(delegate: Arc<dyn StructuredOutputProvider>) -> Self {
        Self { delegate }
    }

    /// Classifies `text`, preferring a caller-supplied hint.
    pub async fn classify(
        &self,
        text: &str,
        hint: Option<ConfidenceLevel>,
        hint_rationale: Option<&str>,
    ) -> Classification {
        match hint {
            Some(level) => Classification::from_hint(level, hint_rationale),
            None => self.classify_text(text).await,
        }
    }

    /// Pattern tier, then delegate tier.
    pub async fn classify_text(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification::new(
                ConfidenceLevel::Low,
                "No answer text to assess",
                ClassificationSource::Fallback,
            );
        }
        if let Some(classification) = classify_by_pattern(text) {
            return classification;
        }

        let request = StructuredRequest::new(
            CLASSIFY_NAME,
            "Record the confidence level of the founder's answer",
            classification_schema(),
        )
        .with_system_prompt(CLASSIFY_SYSTEM_PROMPT)
        .with_prompt(format!("Answer:\n{}", text.trim()));

        match self.delegate.generate(request).await {
            Ok(output) => parse_classification(&output).unwrap_or_else(|| {
                tracing::warn!("confidence delegate returned off-schema output");
                Classification::unavailable()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "confidence delegate failed");
                Classification::unavailable()
            }
        }
    }

    /// Extracts annotations for an answer.
    ///
    /// Never fails: on any delegate problem the summary falls back to the
    /// response cut to `fallback_chars` characters.
    pub async fn extract_annotations(
        &self,
        topic: &Topic,
        response: &str,
        fallback_chars: usize,
    ) -> InputAnnotations {
        let request = StructuredRequest::new(
            EXTRACT_NAME,
            "Record structured notes about the founder's answer",
            annotation_schema(),
        )
        .with_system_prompt(EXTRACT_SYSTEM_PROMPT)
        .with_prompt(format!(
            "Topic: {} ({})\n\nAnswer:\n{}",
            topic.label,
            topic.id,
            response.trim()
        ));

        let extracted = match self.delegate.generate(request).await {
            Ok(output) => parse_annotations(&output),
            Err(err) => {
                tracing::warn!(topic_id = topic.id, error = %err, "annotation delegate failed");
                None
            }
        };
        extracted.unwrap_or_else(|| InputAnnotations::fallback(response, fallback_chars))
    }
}

fn classification_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "level": {
                "type": "string",
                "enum": ["high", "medium", "low"]
            },
            "rationale": { "type": "string" }
        },
        "required": ["level", "rationale"]
    })
}

fn annotation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "key_insight": { "type": "string" },
            "strengths": { "type": "array", "items": { "type": "string" } },
            "considerations": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["summary", "key_insight", "strengths", "considerations"]
    })
}

fn parse_classification(output: &Value) -> Option<Classification> {
    let level: ConfidenceLevel = output.get("level")?.as_str()?.parse().ok()?;
    let rationale = output
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(Classification::new(
        level,
        rationale,
        ClassificationSource::Delegate,
    ))
}

fn parse_annotations(output: &Value) -> Option<InputAnnotations> {
    let text = |key: &str| {
        output
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };
    let list = |key: &str| -> Vec<String> {
        output
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    let annotations = InputAnnotations::new(
        text("summary"),
        text("key_insight"),
        list("strengths"),
        list("considerations"),
    );
    (!annotations.is_blank()).then_some(annotations)
}

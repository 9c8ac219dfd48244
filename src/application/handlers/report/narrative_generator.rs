//! Narrative generation through the structured-output delegate.

use std::sync::Arc;

use crate::domain::foundation::AssessmentError;
use crate::domain::ledger::CapturedInput;
use crate::domain::synthesis::{Narrative, NarrativeSchema, ParsedNarrative, ReadinessAssessment};
use crate::ports::{StructuredOutputProvider, StructuredRequest};

const NARRATIVE_SYSTEM_PROMPT: &str = r#"You are writing the advisory section of an expansion-readiness report for a founder.

The verdicts (coverage, readiness level, positioning) are already decided and must not be contradicted or re-scored. Explain them.

Every list item must reference the domain and topic_id of the captured answer it is based on. Only use topic ids that appear in the captured answers."#;

/// Writes the advisory narrative for an assessment.
#[derive(Clone)]
pub struct NarrativeGenerator {
    delegate: Arc<dyn StructuredOutputProvider>,
}

impl NarrativeGenerator {
    pub fn new(delegate: Arc<dyn StructuredOutputProvider>) -> Self {
        Self { delegate }
    }

    /// Requests the narrative for `assessment` under the schema its status
    /// calls for.
    ///
    /// # Errors
    ///
    /// - `Delegate` when the call fails or the output lacks a summary
    pub async fn generate(
        &self,
        assessment: &ReadinessAssessment,
        inputs: &[CapturedInput],
    ) -> Result<ParsedNarrative, AssessmentError> {
        let schema = NarrativeSchema::for_status(assessment.assessment_status);
        let request = StructuredRequest::new(
            schema.name(),
            "Record the advisory narrative for the readiness report",
            schema.json_schema(),
        )
        .with_system_prompt(NARRATIVE_SYSTEM_PROMPT)
        .with_prompt(build_prompt(assessment, inputs, schema));

        let output = self
            .delegate
            .generate(request)
            .await
            .map_err(|e| AssessmentError::Delegate(e.to_string()))?;

        let parsed = Narrative::parse(&output, schema).ok_or_else(|| {
            AssessmentError::Delegate("Narrative output did not match the requested schema".to_string())
        })?;
        if parsed.dropped_items > 0 {
            tracing::warn!(
                dropped = parsed.dropped_items,
                "narrative items without valid provenance dropped"
            );
        }
        Ok(parsed)
    }
}

fn build_prompt(
    assessment: &ReadinessAssessment,
    inputs: &[CapturedInput],
    schema: NarrativeSchema,
) -> String {
    let verdicts = serde_json::to_string_pretty(assessment).unwrap_or_default();
    let mut prompt = format!("## Verdicts\n{}\n\n## Captured answers\n", verdicts);
    for input in inputs {
        prompt.push_str(&format!(
            "\n- [{} / {}] ({} confidence: {}) {}",
            input.domain,
            input.topic_id,
            input.confidence_level,
            input.confidence_rationale,
            input.response
        ));
        let summary = input.annotations.summary();
        if !summary.is_empty() {
            prompt.push_str(&format!("\n  Summary: {}", summary));
        }
    }
    prompt.push_str(&format!(
        "\n\nFill these sections: summary, {}.",
        schema.sections().join(", ")
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::{ConfidenceLevel, DomainArea, ErrorCode, SessionId};
    use crate::domain::ledger::InputAnnotations;
    use crate::domain::synthesis::ReadinessEngine;
    use serde_json::json;

    fn inputs() -> Vec<CapturedInput> {
        vec![CapturedInput::new(
            SessionId::new(),
            DomainArea::Market,
            "market_size",
            "$40M serviceable market",
            ConfidenceLevel::High,
            "sourced",
            InputAnnotations::default(),
        )]
    }

    #[tokio::test]
    async fn incomplete_assessment_uses_reduced_schema() {
        let provider = Arc::new(MockAIProvider::new().with_structured_output(json!({
            "summary": "Early",
            "strengths": [{ "domain": "market", "topic_id": "market_size", "text": "Sized" }],
            "gaps": [{ "domain": "market", "topic_id": "made_up", "text": "dropped" }],
            "next_steps": []
        })));
        let inputs = inputs();
        let assessment = ReadinessEngine::assess(&inputs);

        let parsed = NarrativeGenerator::new(provider.clone())
            .generate(&assessment, &inputs)
            .await
            .unwrap();

        assert_eq!(parsed.narrative.summary, "Early");
        assert_eq!(parsed.narrative.strengths.len(), 1);
        assert!(parsed.narrative.gaps.is_empty());
        assert_eq!(parsed.dropped_items, 1);
        assert_eq!(provider.structured_calls()[0].name, "record_partial_narrative");
        assert!(provider.structured_calls()[0].prompt.contains("market_size"));
    }

    #[tokio::test]
    async fn delegate_failure_is_delegate_error() {
        let provider = Arc::new(MockAIProvider::new().with_structured_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        }));
        let inputs = inputs();

        let err = NarrativeGenerator::new(provider)
            .generate(&ReadinessEngine::assess(&inputs), &inputs)
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DelegateError);
    }

    #[tokio::test]
    async fn output_without_summary_is_rejected() {
        let provider =
            Arc::new(MockAIProvider::new().with_structured_output(json!({ "strengths": [] })));
        let inputs = inputs();

        let err = NarrativeGenerator::new(provider)
            .generate(&ReadinessEngine::assess(&inputs), &inputs)
            .await
            .unwrap_err();

        assert!(matches!(err, AssessmentError::Delegate(_)));
    }
}

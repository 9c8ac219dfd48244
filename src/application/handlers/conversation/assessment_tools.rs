//! Server-side execution of the interview tools.
//!
//! Every call reloads the session and re-validates against current state,
//! so a delegate can never act on a stale view of the ledger.

use std::sync::Arc;

use super::super::load_session;
use super::{ConfidenceClassifier, TopicLedger};
use crate::domain::conversation::{
    CaptureInputParams, CaptureInputResult, ToolCall, ToolResponse, TransitionDomainParams,
    TransitionDomainResult, TurnEvent, CAPTURE_INPUT, TRANSITION_DOMAIN,
};
use crate::domain::foundation::{
    AssessmentError, ErrorCode, SessionId, SessionStatus, Timestamp,
};
use crate::domain::ledger::{CapturedInput, InputAnnotations};
use crate::domain::registry::TopicRegistry;
use crate::ports::SessionRepository;

/// Per-turn tool bookkeeping.
#[derive(Debug, Default)]
pub struct TurnToolState {
    transitioned: bool,
}

impl TurnToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_transitioned(&self) -> bool {
        self.transitioned
    }
}

/// Result of one tool call.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Response returned to the delegate.
    pub response: ToolResponse,
    /// Stream event for the state change, or the rejection.
    pub event: Option<TurnEvent>,
    /// One-line record for the conversation log and follow-up prompt.
    pub note: String,
}

impl ToolOutcome {
    pub fn is_rejected(&self) -> bool {
        !self.response.is_success()
    }
}

/// Executes `capture_input` and `transition_domain`.
pub struct AssessmentTools {
    sessions: Arc<dyn SessionRepository>,
    ledger: TopicLedger,
    classifier: ConfidenceClassifier,
    annotation_fallback_chars: usize,
}

impl AssessmentTools {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        ledger: TopicLedger,
        classifier: ConfidenceClassifier,
        annotation_fallback_chars: usize,
    ) -> Self {
        Self {
            sessions,
            ledger,
            classifier,
            annotation_fallback_chars,
        }
    }

    /// Dispatches a tool call. Failures become error responses, never panics
    /// or stream errors.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        call: &ToolCall,
        turn: &mut TurnToolState,
    ) -> ToolOutcome {
        match call.name() {
            CAPTURE_INPUT => {
                let result = match CaptureInputParams::parse(call.parameters()) {
                    Ok(params) => self.capture_input(session_id, params).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(captured) => ToolOutcome {
                        note: format!(
                            "Captured {} ({} confidence)",
                            captured.topic_id, captured.confidence_level
                        ),
                        event: Some(TurnEvent::InputCaptured {
                            domain: captured.domain,
                            topic_id: captured.topic_id.clone(),
                            confidence_level: captured.confidence_level,
                        }),
                        response: success(&captured),
                    },
                    Err(err) => rejected(session_id, call, &err),
                }
            }
            TRANSITION_DOMAIN => {
                let result = match TransitionDomainParams::parse(call.parameters()) {
                    Ok(params) => self.transition_domain(session_id, params, turn).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(transition) => ToolOutcome {
                        note: match transition.to {
                            Some(to) => format!("Closed {} and moved to {}", transition.from, to),
                            None => format!("Closed {}; interview complete", transition.from),
                        },
                        event: Some(TurnEvent::DomainChanged {
                            from: transition.from,
                            to: transition.to,
                            assessment_complete: transition.assessment_complete,
                        }),
                        response: success(&transition),
                    },
                    Err(err) => rejected(session_id, call, &err),
                }
            }
            other => {
                tracing::warn!(session_id = %session_id, tool = other, "unknown tool requested");
                let response = ToolResponse::error(
                    format!("Unknown tool: {}", other),
                    ErrorCode::ValidationFailed.to_string(),
                );
                ToolOutcome {
                    event: Some(rejection_event(call, &response)),
                    response,
                    note: format!("{} rejected: unknown tool", other),
                }
            }
        }
    }

    /// Records an answer for a topic of the session's current domain.
    ///
    /// Classification runs before annotation extraction; both only consult
    /// the delegate when needed.
    pub async fn capture_input(
        &self,
        session_id: &SessionId,
        params: CaptureInputParams,
    ) -> Result<CaptureInputResult, AssessmentError> {
        let mut session = load_session(self.sessions.as_ref(), session_id).await?;
        session.ensure_writable(&Timestamp::now())?;

        let domain = session.current_domain();
        let topic_id = params.topic_id.trim().to_string();
        TopicLedger::validate_topic(domain, &topic_id)?;

        let classification = self
            .classifier
            .classify(&params.response, params.hint(), params.rationale.as_deref())
            .await;

        let supplied = InputAnnotations::new(
            params.summary.trim(),
            params.key_insight.trim(),
            params.strengths.clone(),
            params.considerations.clone(),
        );
        let annotations = match TopicRegistry::global().topic(&topic_id) {
            Some(topic) if supplied.is_blank() => {
                self.classifier
                    .extract_annotations(topic, &params.response, self.annotation_fallback_chars)
                    .await
            }
            _ => supplied,
        };

        let stored = self
            .ledger
            .upsert(CapturedInput::new(
                *session_id,
                domain,
                topic_id,
                params.response.trim(),
                classification.level,
                classification.rationale,
                annotations,
            ))
            .await?;

        if session.advance_status(SessionStatus::InProgress)? {
            self.sessions.update(&session).await?;
        }

        let remaining_topic_ids = self.ledger.uncovered_topic_ids(session_id, domain).await?;
        tracing::info!(
            session_id = %session_id,
            domain = %domain,
            topic_id = %stored.topic_id,
            confidence = %stored.confidence_level,
            source = ?classification.source,
            "input captured"
        );

        Ok(CaptureInputResult {
            topic_id: stored.topic_id,
            domain,
            confidence_level: stored.confidence_level,
            confidence_rationale: stored.confidence_rationale,
            remaining_topic_ids,
        })
    }

    /// Closes the current domain if every topic is covered.
    pub async fn transition_domain(
        &self,
        session_id: &SessionId,
        params: TransitionDomainParams,
        turn: &mut TurnToolState,
    ) -> Result<TransitionDomainResult, AssessmentError> {
        if turn.transitioned {
            return Err(AssessmentError::conflict(
                ErrorCode::StateConflict,
                "Only one domain transition is allowed per turn",
            ));
        }

        let mut session = load_session(self.sessions.as_ref(), session_id).await?;
        session.ensure_writable(&Timestamp::now())?;

        let uncovered = self
            .ledger
            .uncovered_topic_ids(session_id, session.current_domain())
            .await?;
        let transition = session.transition_domain(params.domain_summary, uncovered)?;
        self.sessions.update(&session).await?;
        turn.transitioned = true;

        tracing::info!(
            session_id = %session_id,
            from = %transition.from(),
            to = ?transition.to(),
            "domain transitioned"
        );

        Ok(TransitionDomainResult {
            from: transition.from(),
            to: transition.to(),
            assessment_complete: transition.to().is_none(),
            status: session.status(),
        })
    }
}

fn success<T: serde::Serialize>(data: &T) -> ToolResponse {
    match serde_json::to_value(data) {
        Ok(value) => ToolResponse::success(value),
        Err(err) => ToolResponse::error(err.to_string(), ErrorCode::InternalError.to_string()),
    }
}

fn rejected(session_id: &SessionId, call: &ToolCall, err: &AssessmentError) -> ToolOutcome {
    let tool = call.name();
    tracing::warn!(session_id = %session_id, tool, code = %err.code(), error = %err, "tool call rejected");
    let response = ToolResponse::from(err);
    let note = if response.details().is_null() {
        format!("{} rejected: {}", tool, err)
    } else {
        format!("{} rejected: {} {}", tool, err, response.details())
    };
    ToolOutcome {
        event: Some(rejection_event(call, &response)),
        response,
        note,
    }
}

fn rejection_event(call: &ToolCall, response: &ToolResponse) -> TurnEvent {
    TurnEvent::ToolRejected {
        tool: call.name().to_string(),
        topic_id: call
            .parameters()
            .get("topic_id")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        error_code: response.error_code().unwrap_or_default().to_string(),
        message: response.error_message().unwrap_or_default().to_string(),
        details: response.details().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::{InMemoryLedgerRepository, InMemorySessionRepository};
    use crate::domain::foundation::{ConfidenceLevel, DomainArea};
    use crate::domain::session::Session;
    use serde_json::json;

    struct Fixture {
        tools: AssessmentTools,
        sessions: Arc<InMemorySessionRepository>,
        provider: Arc<MockAIProvider>,
        session_id: SessionId,
    }

    async fn fixture(provider: MockAIProvider) -> Fixture {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let provider = Arc::new(provider);
        let (session, _) = Session::start("founder@example.com", 30).unwrap();
        let session_id = *session.id();
        sessions.save(&session).await.unwrap();

        let tools = AssessmentTools::new(
            sessions.clone(),
            TopicLedger::new(Arc::new(InMemoryLedgerRepository::new())),
            ConfidenceClassifier::new(provider.clone()),
            200,
        );
        Fixture {
            tools,
            sessions,
            provider,
            session_id,
        }
    }

    fn capture(topic: &str, response: &str) -> ToolCall {
        ToolCall::new(
            format!("toolu_{}", topic),
            CAPTURE_INPUT,
            json!({
                "topic_id": topic,
                "response": response,
                "summary": "summary",
                "key_insight": "insight",
                "strengths": [],
                "considerations": []
            }),
        )
    }

    fn transition() -> ToolCall {
        ToolCall::new("toolu_t", TRANSITION_DOMAIN, json!({ "domain_summary": "done" }))
    }

    async fn cover_market(f: &Fixture) {
        let mut turn = TurnToolState::new();
        for topic in TopicRegistry::global().topic_ids(DomainArea::Market) {
            let outcome = f
                .tools
                .execute(&f.session_id, &capture(topic, "We have 340 paying customers"), &mut turn)
                .await;
            assert!(outcome.response.is_success(), "{:?}", outcome.response);
        }
    }

    #[tokio::test]
    async fn capture_records_input_and_moves_to_in_progress() {
        let f = fixture(MockAIProvider::new()).await;
        let mut turn = TurnToolState::new();

        let outcome = f
            .tools
            .execute(&f.session_id, &capture("market_size", "We have 340 paying customers"), &mut turn)
            .await;

        assert!(outcome.response.is_success());
        assert_eq!(
            outcome.event,
            Some(TurnEvent::InputCaptured {
                domain: DomainArea::Market,
                topic_id: "market_size".to_string(),
                confidence_level: ConfidenceLevel::High,
            })
        );
        let data = outcome.response.data().unwrap();
        assert_eq!(data["remaining_topic_ids"].as_array().unwrap().len(), 4);

        let session = f.sessions.find_by_id(&f.session_id).await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        // Pattern tier matched and annotations were supplied.
        assert_eq!(f.provider.structured_call_count(), 0);
    }

    #[tokio::test]
    async fn capture_with_foreign_topic_lists_valid_ids() {
        let f = fixture(MockAIProvider::new()).await;
        let mut turn = TurnToolState::new();

        let outcome = f
            .tools
            .execute(&f.session_id, &capture("cash_runway", "8 months"), &mut turn)
            .await;

        assert!(!outcome.response.is_success());
        assert_eq!(outcome.response.error_code(), Some("INVALID_TOPIC"));
        let valid = outcome.response.details()["valid_topic_ids"].as_array().unwrap();
        assert_eq!(valid.len(), 5);
        assert!(outcome.is_rejected());
        assert!(outcome.note.contains("rejected"));
        match outcome.event {
            Some(TurnEvent::ToolRejected {
                tool,
                topic_id,
                error_code,
                details,
                ..
            }) => {
                assert_eq!(tool, CAPTURE_INPUT);
                assert_eq!(topic_id.as_deref(), Some("cash_runway"));
                assert_eq!(error_code, "INVALID_TOPIC");
                assert_eq!(details["valid_topic_ids"].as_array().unwrap().len(), 5);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_annotations_are_extracted() {
        let f = fixture(MockAIProvider::new().with_structured_output(json!({
            "summary": "Clinic owners",
            "key_insight": "Independent clinics",
            "strengths": [],
            "considerations": []
        })))
        .await;

        let result = f
            .tools
            .capture_input(
                &f.session_id,
                CaptureInputParams::parse(&json!({
                    "topic_id": "target_customer",
                    "response": "We have 40 paying customers among clinics",
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert_eq!(f.provider.structured_call_count(), 1);
        assert_eq!(f.provider.structured_calls()[0].name, "record_annotations");
    }

    #[tokio::test]
    async fn hint_is_used_verbatim() {
        let f = fixture(MockAIProvider::new()).await;

        let result = f
            .tools
            .capture_input(
                &f.session_id,
                CaptureInputParams::parse(&json!({
                    "topic_id": "market_size",
                    "response": "We think it is large",
                    "summary": "Large",
                    "confidence_hint": "medium",
                    "rationale": "Desk research"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(result.confidence_rationale, "Desk research");
    }

    #[tokio::test]
    async fn transition_lists_missing_topics() {
        let f = fixture(MockAIProvider::new()).await;
        let mut turn = TurnToolState::new();
        f.tools
            .execute(&f.session_id, &capture("market_size", "$2M in ARR"), &mut turn)
            .await;

        let outcome = f.tools.execute(&f.session_id, &transition(), &mut turn).await;

        assert_eq!(outcome.response.error_code(), Some("STATE_CONFLICT"));
        let missing = outcome.response.details()["missing_topic_ids"].as_array().unwrap();
        assert_eq!(missing.len(), 4);
        assert!(!turn.has_transitioned());
    }

    #[tokio::test]
    async fn transition_advances_once_per_turn() {
        let f = fixture(MockAIProvider::new()).await;
        cover_market(&f).await;
        let mut turn = TurnToolState::new();

        let first = f.tools.execute(&f.session_id, &transition(), &mut turn).await;
        let second = f.tools.execute(&f.session_id, &transition(), &mut turn).await;

        assert_eq!(
            first.event,
            Some(TurnEvent::DomainChanged {
                from: DomainArea::Market,
                to: Some(DomainArea::Product),
                assessment_complete: false,
            })
        );
        assert_eq!(second.response.error_code(), Some("STATE_CONFLICT"));

        let session = f.sessions.find_by_id(&f.session_id).await.unwrap().unwrap();
        assert_eq!(session.current_domain(), DomainArea::Product);
        assert_eq!(
            session.domain_summaries().get(&DomainArea::Market).map(String::as_str),
            Some("done")
        );
    }

    #[tokio::test]
    async fn expired_session_rejects_capture() {
        let f = fixture(MockAIProvider::new()).await;
        let session = f.sessions.find_by_id(&f.session_id).await.unwrap().unwrap();
        let expired = Session::reconstitute(
            *session.id(),
            session.email().to_string(),
            session.recovery_token_hash().to_string(),
            session.status(),
            session.current_domain(),
            session.domain_summaries().clone(),
            session.created_at().minus_days(40),
            session.updated_at().minus_days(40),
            session.created_at().minus_days(10),
        );
        f.sessions.update(&expired).await.unwrap();
        let mut turn = TurnToolState::new();

        let outcome = f
            .tools
            .execute(&f.session_id, &capture("market_size", "$2M"), &mut turn)
            .await;

        assert_eq!(outcome.response.error_code(), Some("SESSION_EXPIRED"));
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let f = fixture(MockAIProvider::new()).await;
        let mut turn = TurnToolState::new();
        let outcome = f
            .tools
            .execute(&f.session_id, &ToolCall::new("x", "delete_everything", json!({})), &mut turn)
            .await;
        assert_eq!(outcome.response.error_code(), Some("VALIDATION_FAILED"));
    }
}

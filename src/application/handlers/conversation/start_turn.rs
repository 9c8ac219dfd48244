//! StartTurnHandler - one dialogue turn as an ordered event stream.
//!
//! The turn runs in a spawned task that writes to a bounded channel. If the
//! consumer goes away the task still runs to completion, so ledger writes
//! made by tool calls are never lost halfway.

use std::pin::Pin;
use std::sync::Arc;

use futures::{stream, Stream, StreamExt};
use tokio::sync::mpsc;

use super::super::load_session;
use super::{AssessmentTools, TopicLedger, TurnGate, TurnPermit, TurnToolState};
use crate::domain::conversation::{
    assessment_tools, follow_up_prompt, interview_system_prompt, StoredMessage, StoredRole,
    TurnEvent,
};
use crate::domain::foundation::{AssessmentError, ErrorCode, SessionId, Timestamp};
use crate::domain::ledger::distinct_covered;
use crate::domain::session::Session;
use crate::ports::{
    AIError, ConversationRepository, DialogueEvent, DialogueProvider, DialogueRequest, Message,
    SessionRepository,
};

const EVENT_BUFFER: usize = 32;

/// Ordered events of one turn, ending with `TurnEvent::Complete`.
pub type TurnEventStream = Pin<Box<dyn Stream<Item = TurnEvent> + Send>>;

/// Command to run one turn.
#[derive(Debug, Clone)]
pub struct StartTurnCommand {
    pub session_id: SessionId,
    pub content: String,
}

impl StartTurnCommand {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
        }
    }
}

/// Limits applied to each turn.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    pub max_message_chars: usize,
    pub max_history_messages: usize,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 10_000,
            max_history_messages: 20,
        }
    }
}

/// Why a turn ended early. Reported as an `error` event.
#[derive(Debug)]
enum TurnFailure {
    Delegate(AIError),
    NoResponse,
    Assessment(AssessmentError),
}

impl From<AssessmentError> for TurnFailure {
    fn from(err: AssessmentError) -> Self {
        TurnFailure::Assessment(err)
    }
}

impl TurnFailure {
    fn into_event(self) -> TurnEvent {
        match self {
            TurnFailure::Delegate(err) => TurnEvent::error(ErrorCode::DelegateError, err.to_string()),
            TurnFailure::NoResponse => TurnEvent::error(
                ErrorCode::NoResponse,
                "The assistant did not produce a reply",
            ),
            TurnFailure::Assessment(err) => TurnEvent::error(err.code(), err.to_string()),
        }
    }
}

/// Tool activity of one turn.
#[derive(Debug, Default)]
struct TurnLog {
    /// One line per call, for the conversation log and follow-up prompt.
    notes: Vec<String>,
    /// `tool -> ToolResponse` JSON for each refused call.
    rejections: Vec<String>,
}

/// Handler for dialogue turns.
pub struct StartTurnHandler {
    runner: Arc<TurnRunner>,
    sessions: Arc<dyn SessionRepository>,
    gate: TurnGate,
    config: TurnConfig,
}

impl StartTurnHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        ledger: TopicLedger,
        conversations: Arc<dyn ConversationRepository>,
        dialogue: Arc<dyn DialogueProvider>,
        tools: AssessmentTools,
        gate: TurnGate,
        config: TurnConfig,
    ) -> Self {
        let runner = TurnRunner {
            sessions: Arc::clone(&sessions),
            ledger,
            conversations,
            dialogue,
            tools,
            max_history_messages: config.max_history_messages,
        };
        Self {
            runner: Arc::new(runner),
            sessions,
            gate,
            config,
        }
    }

    /// Validates the request, claims the session and starts the turn.
    ///
    /// # Errors
    ///
    /// - `Validation` for empty or oversized text
    /// - `NotFound` / `Expired` / `StateConflict(SESSION_ABANDONED)` per session state
    /// - `StateConflict(TURN_IN_PROGRESS)` while another turn runs
    pub async fn handle(&self, cmd: StartTurnCommand) -> Result<TurnEventStream, AssessmentError> {
        let content = cmd.content.trim().to_string();
        if content.is_empty() {
            return Err(AssessmentError::validation("content", "Message cannot be empty"));
        }
        let length = content.chars().count();
        if length > self.config.max_message_chars {
            return Err(AssessmentError::validation(
                "content",
                format!(
                    "Message is {} characters; the limit is {}",
                    length, self.config.max_message_chars
                ),
            ));
        }

        let session = load_session(self.sessions.as_ref(), &cmd.session_id).await?;
        session.ensure_writable(&Timestamp::now())?;

        let permit = self.gate.try_acquire(cmd.session_id).ok_or_else(|| {
            AssessmentError::conflict(
                ErrorCode::TurnInProgress,
                "A turn is already running for this session",
            )
        })?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            runner.run(session, content, permit, tx).await;
        });

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })))
    }
}

struct TurnRunner {
    sessions: Arc<dyn SessionRepository>,
    ledger: TopicLedger,
    conversations: Arc<dyn ConversationRepository>,
    dialogue: Arc<dyn DialogueProvider>,
    tools: AssessmentTools,
    max_history_messages: usize,
}

impl TurnRunner {
    async fn run(
        &self,
        session: Session,
        content: String,
        permit: TurnPermit,
        tx: mpsc::Sender<TurnEvent>,
    ) {
        let session_id = *session.id();
        tracing::info!(session_id = %session_id, domain = %session.current_domain(), "turn started");

        let mut turn = TurnToolState::new();
        let mut log = TurnLog::default();
        let mut reply = String::new();

        if let Err(failure) = self
            .converse(&session, &content, &tx, &mut turn, &mut log, &mut reply)
            .await
        {
            tracing::warn!(session_id = %session_id, failure = ?failure, "turn ended with error");
            let _ = tx.send(failure.into_event()).await;
        }

        self.record(session_id, &reply, &log.notes).await;
        let complete = self.completion(&session).await;

        // Release before the closing event so the client can send the next
        // message as soon as it sees `complete`.
        drop(permit);
        let _ = tx.send(complete).await;
        tracing::info!(
            session_id = %session_id,
            tool_calls = log.notes.len(),
            rejected = log.rejections.len(),
            "turn finished"
        );
    }

    async fn converse(
        &self,
        session: &Session,
        content: &str,
        tx: &mpsc::Sender<TurnEvent>,
        turn: &mut TurnToolState,
        log: &mut TurnLog,
        reply: &mut String,
    ) -> Result<(), TurnFailure> {
        let session_id = *session.id();

        let history = self
            .conversations
            .recent(&session_id, self.max_history_messages)
            .await
            .map_err(AssessmentError::from)?;
        let mut messages: Vec<Message> = history.iter().map(to_dialogue_message).collect();
        messages.push(Message::user(content));

        if let Err(err) = self
            .conversations
            .append(&StoredMessage::user(session_id, content))
            .await
        {
            tracing::warn!(session_id = %session_id, error = %err, "failed to log user message");
        }

        let system_prompt = self.system_prompt(&session_id).await?;
        let request =
            DialogueRequest::new(system_prompt, messages.clone()).with_tools(assessment_tools());
        self.stream_pass(request, &session_id, tx, turn, log, reply)
            .await?;

        let replied = !reply.trim().is_empty();
        if replied && log.rejections.is_empty() {
            return Ok(());
        }

        // A text-less pass, or text that claims work a rejected call never
        // did, gets one tools-disabled follow-up carrying the tool results.
        tracing::debug!(
            session_id = %session_id,
            replied,
            rejected = log.rejections.len(),
            "requesting follow-up without tools"
        );
        if replied {
            messages.push(Message::assistant(reply.trim()));
        }
        messages.push(Message::user(follow_up_prompt(
            &log.notes,
            &log.rejections,
            replied,
        )));
        let system_prompt = self.system_prompt(&session_id).await?;
        self.stream_pass(
            DialogueRequest::new(system_prompt, messages),
            &session_id,
            tx,
            turn,
            log,
            reply,
        )
        .await?;

        if reply.trim().is_empty() {
            return Err(TurnFailure::NoResponse);
        }
        Ok(())
    }

    /// Prompt for the session's current state; rebuilt per pass because a
    /// transition in the first pass changes the domain.
    async fn system_prompt(&self, session_id: &SessionId) -> Result<String, TurnFailure> {
        let session = load_session(self.sessions.as_ref(), session_id).await?;
        let domain = session.current_domain();
        let covered = self.ledger.covered_topic_ids(session_id, domain).await?;
        Ok(interview_system_prompt(
            domain,
            &covered,
            session.domain_summaries(),
        ))
    }

    async fn stream_pass(
        &self,
        request: DialogueRequest,
        session_id: &SessionId,
        tx: &mpsc::Sender<TurnEvent>,
        turn: &mut TurnToolState,
        log: &mut TurnLog,
        reply: &mut String,
    ) -> Result<(), TurnFailure> {
        let tools_enabled = request.tools_enabled();
        let mut separate = !reply.trim().is_empty();
        let mut events = self
            .dialogue
            .stream_dialogue(request)
            .await
            .map_err(TurnFailure::Delegate)?;

        while let Some(event) = events.next().await {
            match event.map_err(TurnFailure::Delegate)? {
                DialogueEvent::TextDelta(delta) => {
                    if delta.is_empty() {
                        continue;
                    }
                    let delta = if separate {
                        separate = false;
                        format!("\n\n{}", delta.trim_start())
                    } else {
                        delta
                    };
                    reply.push_str(&delta);
                    let _ = tx.send(TurnEvent::text(delta)).await;
                }
                DialogueEvent::ToolCall(call) if tools_enabled => {
                    let outcome = self.tools.execute(session_id, &call, turn).await;
                    if outcome.is_rejected() {
                        log.rejections
                            .push(format!("{} -> {}", call.name(), outcome.response.to_json()));
                    }
                    log.notes.push(outcome.note);
                    if let Some(event) = outcome.event {
                        let _ = tx.send(event).await;
                    }
                }
                DialogueEvent::ToolCall(call) => {
                    tracing::warn!(session_id = %session_id, tool = call.name(), "tool call ignored in tools-disabled pass");
                }
                DialogueEvent::Finished => break,
            }
        }
        Ok(())
    }

    async fn record(&self, session_id: SessionId, reply: &str, notes: &[String]) {
        let mut entries = Vec::with_capacity(2);
        if !reply.trim().is_empty() {
            entries.push(StoredMessage::assistant(session_id, reply.trim()));
        }
        if !notes.is_empty() {
            entries.push(StoredMessage::tool_note(session_id, notes.join("\n")));
        }
        for entry in entries {
            if let Err(err) = self.conversations.append(&entry).await {
                tracing::warn!(
                    session_id = %session_id,
                    role = entry.role.as_str(),
                    error = %err,
                    "failed to log turn message"
                );
            }
        }
    }

    async fn completion(&self, before: &Session) -> TurnEvent {
        let session_id = *before.id();
        let session = match load_session(self.sessions.as_ref(), &session_id).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "could not reload session");
                before.clone()
            }
        };
        let topics_covered = match self.ledger.query(&session_id, None).await {
            Ok(rows) => distinct_covered(&rows),
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "could not count coverage");
                0
            }
        };
        TurnEvent::Complete {
            session_id,
            current_domain: session.current_domain(),
            status: session.status(),
            topics_covered,
        }
    }
}

fn to_dialogue_message(message: &StoredMessage) -> Message {
    match message.role {
        StoredRole::User => Message::user(&message.content),
        StoredRole::Assistant => Message::assistant(&message.content),
        StoredRole::ToolNote => {
            Message::assistant(format!("[Recorded actions]\n{}", message.content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockDialogue, MockError, MockStep};
    use crate::adapters::storage::{
        InMemoryConversationRepository, InMemoryLedgerRepository, InMemorySessionRepository,
    };
    use crate::application::handlers::conversation::ConfidenceClassifier;
    use crate::domain::conversation::{ToolCall, CAPTURE_INPUT};
    use crate::domain::foundation::{ConfidenceLevel, DomainArea, SessionStatus};
    use crate::ports::MessageRole;
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        handler: StartTurnHandler,
        provider: Arc<MockAIProvider>,
        sessions: Arc<InMemorySessionRepository>,
        conversations: Arc<InMemoryConversationRepository>,
        session_id: SessionId,
    }

    async fn fixture(provider: MockAIProvider) -> Fixture {
        let provider = Arc::new(provider);
        let sessions = Arc::new(InMemorySessionRepository::new());
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let ledger = TopicLedger::new(Arc::new(InMemoryLedgerRepository::new()));
        let (session, _) = Session::start("founder@example.com", 30).unwrap();
        let session_id = *session.id();
        sessions.save(&session).await.unwrap();

        let tools = AssessmentTools::new(
            sessions.clone(),
            ledger.clone(),
            ConfidenceClassifier::new(provider.clone()),
            200,
        );
        let handler = StartTurnHandler::new(
            sessions.clone(),
            ledger,
            conversations.clone(),
            provider.clone(),
            tools,
            TurnGate::new(),
            TurnConfig::default(),
        );
        Fixture {
            handler,
            provider,
            sessions,
            conversations,
            session_id,
        }
    }

    fn capture_call(topic: &str) -> ToolCall {
        ToolCall::new(
            format!("toolu_{}", topic),
            CAPTURE_INPUT,
            json!({
                "topic_id": topic,
                "response": "We have 340 paying customers",
                "summary": "Traction",
                "key_insight": "Paying base",
                "strengths": [],
                "considerations": []
            }),
        )
    }

    async fn run(f: &Fixture, content: &str) -> Vec<TurnEvent> {
        f.handler
            .handle(StartTurnCommand::new(f.session_id, content))
            .await
            .unwrap()
            .collect()
            .await
    }

    #[tokio::test]
    async fn text_reply_streams_then_completes() {
        let f = fixture(MockAIProvider::new().with_dialogue(MockDialogue::text("Tell me about your customers."))).await;

        let events = run(&f, "Hi").await;

        assert_eq!(events[0], TurnEvent::text("Tell me about your customers."));
        assert!(events.last().unwrap().is_complete());
        assert_eq!(events.len(), 2);

        let log = f.conversations.all(&f.session_id).await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, StoredRole::User);
        assert_eq!(log[1].role, StoredRole::Assistant);
    }

    #[tokio::test]
    async fn tool_only_pass_triggers_single_follow_up() {
        let f = fixture(
            MockAIProvider::new()
                .with_dialogue(MockDialogue::tools(vec![capture_call("market_size")]))
                .with_dialogue(MockDialogue::text("Noted. Who is your customer?")),
        )
        .await;

        let events = run(&f, "We have 340 paying customers").await;

        assert_eq!(
            events[0],
            TurnEvent::InputCaptured {
                domain: DomainArea::Market,
                topic_id: "market_size".to_string(),
                confidence_level: ConfidenceLevel::High,
            }
        );
        assert_eq!(events[1], TurnEvent::text("Noted. Who is your customer?"));
        match events.last().unwrap() {
            TurnEvent::Complete {
                status,
                topics_covered,
                ..
            } => {
                assert_eq!(*status, SessionStatus::InProgress);
                assert_eq!(*topics_covered, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let calls = f.provider.dialogue_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].tools_enabled());
        assert!(!calls[1].tools_enabled());
        let seed = &calls[1].messages.last().unwrap().content;
        assert!(seed.contains("Captured market_size"));

        let log = f.conversations.all(&f.session_id).await;
        assert_eq!(log.last().unwrap().role, StoredRole::ToolNote);
    }

    #[tokio::test]
    async fn rejected_capture_after_text_gets_corrective_follow_up() {
        let f = fixture(
            MockAIProvider::new()
                .with_dialogue(MockDialogue::Steps(vec![
                    MockStep::Text("Great, recorded your runway!".to_string()),
                    MockStep::Tool(capture_call("cash_runway")),
                ]))
                .with_dialogue(MockDialogue::text("Correction: runway comes later.")),
        )
        .await;

        let events = run(&f, "We have 8 months of runway").await;

        assert_eq!(events[0], TurnEvent::text("Great, recorded your runway!"));
        match &events[1] {
            TurnEvent::ToolRejected {
                tool,
                topic_id,
                error_code,
                details,
                ..
            } => {
                assert_eq!(tool, CAPTURE_INPUT);
                assert_eq!(topic_id.as_deref(), Some("cash_runway"));
                assert_eq!(error_code, "INVALID_TOPIC");
                assert!(details["valid_topic_ids"].is_array());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(events[2], TurnEvent::text("\n\nCorrection: runway comes later."));
        match events.last().unwrap() {
            TurnEvent::Complete {
                status,
                topics_covered,
                ..
            } => {
                assert_eq!(*status, SessionStatus::Started);
                assert_eq!(*topics_covered, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let calls = f.provider.dialogue_calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[1].tools_enabled());
        let messages = &calls[1].messages;
        let claimed = &messages[messages.len() - 2];
        assert_eq!(claimed.role, MessageRole::Assistant);
        assert_eq!(claimed.content, "Great, recorded your runway!");
        let seed = &messages.last().unwrap().content;
        assert!(seed.contains("valid_topic_ids"));
        assert!(seed.contains("market_size"));

        let log = f.conversations.all(&f.session_id).await;
        let assistant = log.iter().find(|m| m.role == StoredRole::Assistant).unwrap();
        assert!(assistant.content.ends_with("Correction: runway comes later."));
    }

    #[tokio::test]
    async fn accepted_capture_after_text_needs_no_follow_up() {
        let f = fixture(MockAIProvider::new().with_dialogue(MockDialogue::Steps(vec![
            MockStep::Text("Noted.".to_string()),
            MockStep::Tool(capture_call("market_size")),
        ])))
        .await;

        let events = run(&f, "We have 340 paying customers").await;

        assert_eq!(f.provider.dialogue_call_count(), 1);
        assert!(!events
            .iter()
            .any(|e| matches!(e, TurnEvent::ToolRejected { .. })));
    }

    #[tokio::test]
    async fn silent_follow_up_reports_no_response() {
        let f = fixture(
            MockAIProvider::new()
                .with_dialogue(MockDialogue::silent())
                .with_dialogue(MockDialogue::silent()),
        )
        .await;

        let events = run(&f, "Hello").await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TurnEvent::error(ErrorCode::NoResponse, "The assistant did not produce a reply"));
        assert!(events[1].is_complete());
        assert_eq!(f.provider.dialogue_call_count(), 2);
    }

    #[tokio::test]
    async fn delegate_failure_emits_error_then_complete() {
        let f = fixture(MockAIProvider::new().with_dialogue(MockDialogue::Steps(vec![
            MockStep::Text("Partial".to_string()),
            MockStep::Fail(MockError::Network {
                message: "reset".to_string(),
            }),
        ])))
        .await;

        let events = run(&f, "Hello").await;

        assert_eq!(events[0], TurnEvent::text("Partial"));
        match &events[1] {
            TurnEvent::Error { code, .. } => assert_eq!(code, "DELEGATE_ERROR"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(events[2].is_complete());
        assert_eq!(f.provider.dialogue_call_count(), 1);
    }

    #[tokio::test]
    async fn rejects_blank_and_oversized_text() {
        let f = fixture(MockAIProvider::new()).await;

        let err = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "   "))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "x".repeat(10_001)))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(f.provider.dialogue_call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let f = fixture(MockAIProvider::new()).await;
        let err = f
            .handler
            .handle(StartTurnCommand::new(SessionId::new(), "Hello"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn concurrent_turn_is_rejected() {
        let f = fixture(MockAIProvider::new().with_delay(Duration::from_millis(100))).await;

        let first = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "Hello"))
            .await
            .unwrap();
        let err = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "Again"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::TurnInProgress);

        let events: Vec<TurnEvent> = first.collect().await;
        assert!(events.last().unwrap().is_complete());

        // The permit is released before `complete` is sent.
        assert!(f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "Next"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn dropped_consumer_keeps_ledger_writes() {
        let f = fixture(
            MockAIProvider::new()
                .with_dialogue(MockDialogue::Steps(vec![
                    MockStep::Tool(capture_call("market_size")),
                    MockStep::Text("Thanks".to_string()),
                ]))
                .with_delay(Duration::from_millis(20)),
        )
        .await;

        let stream = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "We have 340 paying customers"))
            .await
            .unwrap();
        drop(stream);

        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let session = f.sessions.find_by_id(&f.session_id).await.unwrap().unwrap();
            if session.status() == SessionStatus::InProgress {
                return;
            }
        }
        panic!("capture was not applied after consumer disconnect");
    }

    #[tokio::test]
    async fn history_is_capped_and_tool_notes_replayed() {
        let f = fixture(MockAIProvider::new()).await;
        for i in 0..30 {
            f.conversations
                .append(&StoredMessage::user(f.session_id, format!("old {}", i)))
                .await
                .unwrap();
        }
        f.conversations
            .append(&StoredMessage::tool_note(f.session_id, "Captured market_size (high confidence)"))
            .await
            .unwrap();

        run(&f, "Hello").await;

        let request = &f.provider.dialogue_calls()[0];
        assert_eq!(request.messages.len(), 21);
        let note = &request.messages[19];
        assert_eq!(note.role, MessageRole::Assistant);
        assert!(note.content.starts_with("[Recorded actions]"));
        assert_eq!(request.messages[20].content, "Hello");
    }

    #[tokio::test]
    async fn abandoned_session_rejects_turn() {
        let f = fixture(MockAIProvider::new()).await;
        let mut session = f.sessions.find_by_id(&f.session_id).await.unwrap().unwrap();
        session.abandon().unwrap();
        f.sessions.update(&session).await.unwrap();

        let err = f
            .handler
            .handle(StartTurnCommand::new(f.session_id, "Hello"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::SessionAbandoned);
    }
}

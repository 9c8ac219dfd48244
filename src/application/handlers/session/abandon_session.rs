//! AbandonSessionHandler - Terminal exit from an assessment.

use std::sync::Arc;

use super::super::load_session;
use crate::domain::foundation::{AssessmentError, SessionId, SessionStatus, Timestamp};
use crate::ports::SessionRepository;

/// Command to abandon a session.
#[derive(Debug, Clone)]
pub struct AbandonSessionCommand {
    pub session_id: SessionId,
}

/// Handler for abandoning sessions.
pub struct AbandonSessionHandler {
    sessions: Arc<dyn SessionRepository>,
}

impl AbandonSessionHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: AbandonSessionCommand) -> Result<SessionStatus, AssessmentError> {
        let mut session = load_session(self.sessions.as_ref(), &cmd.session_id).await?;
        session.ensure_writable(&Timestamp::now())?;

        session.abandon()?;
        self.sessions.update(&session).await?;

        tracing::info!(session_id = %cmd.session_id, "session abandoned");
        Ok(session.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::session::Session;

    #[tokio::test]
    async fn abandon_is_terminal() {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let (session, _) = Session::start("founder@example.com", 30).unwrap();
        let id = *session.id();
        sessions.save(&session).await.unwrap();
        let handler = AbandonSessionHandler::new(sessions.clone());

        let status = handler
            .handle(AbandonSessionCommand { session_id: id })
            .await
            .unwrap();
        assert_eq!(status, SessionStatus::Abandoned);

        let stored = sessions.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Abandoned);

        let err = handler
            .handle(AbandonSessionCommand { session_id: id })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionAbandoned);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let handler = AbandonSessionHandler::new(Arc::new(InMemorySessionRepository::new()));
        let err = handler
            .handle(AbandonSessionCommand {
                session_id: SessionId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }
}

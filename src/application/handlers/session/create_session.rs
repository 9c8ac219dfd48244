//! CreateSessionHandler - Command handler for starting an assessment.

use std::sync::Arc;

use crate::domain::foundation::{AssessmentError, DomainArea, SessionId, SessionStatus, Timestamp};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// Command to start a new assessment session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub email: String,
}

/// Result of successful session creation.
///
/// `recovery_token` is the only copy of the plaintext token; it is never
/// stored and cannot be recovered later.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session_id: SessionId,
    pub recovery_token: String,
    pub current_domain: DomainArea,
    pub status: SessionStatus,
    pub expires_at: Timestamp,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    session_ttl_days: i64,
}

impl CreateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, session_ttl_days: i64) -> Self {
        Self {
            repository,
            session_ttl_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResult, AssessmentError> {
        // 1. Create session aggregate (validates email)
        let (session, token) = Session::start(cmd.email, self.session_ttl_days)?;

        // 2. Persist session
        self.repository.save(&session).await?;

        tracing::info!(session_id = %session.id(), "assessment session created");

        Ok(CreateSessionResult {
            session_id: *session.id(),
            recovery_token: token.as_str().to_string(),
            current_domain: session.current_domain(),
            status: session.status(),
            expires_at: *session.expires_at(),
        })
    }
}

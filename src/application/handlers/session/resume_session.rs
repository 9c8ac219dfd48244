//! ResumeSessionHandler - Re-enter a session with its recovery token.

use std::sync::Arc;

use super::super::load_session;
use super::ProgressView;
use crate::domain::foundation::{AssessmentError, SessionId, Timestamp};
use crate::ports::{LedgerRepository, SessionRepository};

/// Command to resume a session.
#[derive(Debug, Clone)]
pub struct ResumeSessionCommand {
    pub session_id: SessionId,
    pub recovery_token: String,
}

/// Handler for resuming sessions.
pub struct ResumeSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl ResumeSessionHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { sessions, ledger }
    }

    /// Verifies the token and returns the current progress.
    ///
    /// A wrong token reports `NotFound`, so session ids cannot be probed.
    pub async fn handle(&self, cmd: ResumeSessionCommand) -> Result<ProgressView, AssessmentError> {
        let session = load_session(self.sessions.as_ref(), &cmd.session_id).await?;

        if !session.verify_recovery_token(cmd.recovery_token.trim()) {
            tracing::warn!(session_id = %cmd.session_id, "recovery token rejected");
            return Err(AssessmentError::NotFound(cmd.session_id));
        }
        session.ensure_writable(&Timestamp::now())?;

        let inputs = self.ledger.list_by_session(&cmd.session_id, None).await?;
        tracing::info!(session_id = %cmd.session_id, "session resumed");
        Ok(ProgressView::from_ledger(&session, &inputs))
    }
}

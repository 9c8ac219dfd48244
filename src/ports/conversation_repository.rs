//! Conversation log repository port.

use crate::domain::conversation::StoredMessage;
use crate::domain::foundation::{DomainError, SessionId};
use async_trait::async_trait;

/// Append-only log of a session's conversation.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Appends a message to the session's log.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, message: &StoredMessage) -> Result<(), DomainError>;

    /// Returns the last `limit` messages, oldest first.
    async fn recent(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, DomainError>;
}

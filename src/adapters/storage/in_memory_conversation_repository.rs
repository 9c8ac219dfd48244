//! In-Memory Conversation Repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::StoredMessage;
use crate::domain::foundation::{DomainError, SessionId};
use crate::ports::ConversationRepository;

/// In-memory conversation log
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationRepository {
    messages: Arc<RwLock<HashMap<SessionId, Vec<StoredMessage>>>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages of a session (useful for tests)
    pub async fn all(&self, session_id: &SessionId) -> Vec<StoredMessage> {
        self.messages
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn append(&self, message: &StoredMessage) -> Result<(), DomainError> {
        self.messages
            .write()
            .await
            .entry(message.session_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, DomainError> {
        let messages = self.messages.read().await;
        let log = messages.get(session_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = log.len().saturating_sub(limit);
        Ok(log[start..].to_vec())
    }
}

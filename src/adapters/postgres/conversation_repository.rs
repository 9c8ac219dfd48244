//! PostgreSQL implementation of ConversationRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::row_error;
use crate::domain::conversation::{StoredMessage, StoredRole};
use crate::domain::foundation::{DomainError, MessageId, SessionId, Timestamp};
use crate::ports::ConversationRepository;

/// PostgreSQL implementation of ConversationRepository.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn append(&self, message: &StoredMessage) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO assessment_messages (id, session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.session_id.as_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert message: {}", e)))?;

        Ok(())
    }

    async fn recent(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, DomainError> {
        // Newest `limit` rows, flipped back to oldest first.
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM (
                SELECT id, session_id, role, content, created_at, seq
                FROM assessment_messages
                WHERE session_id = $1
                ORDER BY seq DESC
                LIMIT $2
            ) latest
            ORDER BY seq ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch messages: {}", e)))?;

        rows.into_iter().map(row_to_message).collect()
    }
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<StoredMessage, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(row_error("id"))?;
    let session_id: uuid::Uuid = row.try_get("session_id").map_err(row_error("session_id"))?;
    let role: String = row.try_get("role").map_err(row_error("role"))?;
    let content: String = row.try_get("content").map_err(row_error("content"))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(row_error("created_at"))?;

    Ok(StoredMessage {
        id: MessageId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        role: role.parse::<StoredRole>().map_err(DomainError::database)?,
        content,
        created_at: Timestamp::from_datetime(created_at),
    })
}

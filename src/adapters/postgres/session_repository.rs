//! PostgreSQL implementation of SessionRepository.
//!
//! Persists Session aggregates to PostgreSQL. Domain summaries are stored as
//! a JSONB object keyed by domain id.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::row_error;
use crate::domain::foundation::{
    DomainArea, DomainError, ErrorCode, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO assessment_sessions (
                id, email, recovery_token_hash, status, current_domain,
                domain_summaries, created_at, updated_at, expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.email())
        .bind(session.recovery_token_hash())
        .bind(session.status().as_str())
        .bind(session.current_domain().as_str())
        .bind(summaries_to_json(session.domain_summaries()))
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .bind(session.expires_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert session: {}", e)))?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE assessment_sessions SET
                status = $2,
                current_domain = $3,
                domain_summaries = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.current_domain().as_str())
        .bind(summaries_to_json(session.domain_summaries()))
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update session: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, recovery_token_hash, status, current_domain,
                   domain_summaries, created_at, updated_at, expires_at
            FROM assessment_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch session: {}", e)))?;

        row.map(row_to_session).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn summaries_to_json(summaries: &BTreeMap<DomainArea, String>) -> serde_json::Value {
    summaries
        .iter()
        .map(|(domain, summary)| {
            (
                domain.as_str().to_string(),
                serde_json::Value::String(summary.clone()),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn json_to_summaries(value: serde_json::Value) -> Result<BTreeMap<DomainArea, String>, DomainError> {
    let serde_json::Value::Object(map) = value else {
        return Err(DomainError::database("domain_summaries is not an object"));
    };
    map.into_iter()
        .map(|(key, summary)| {
            let domain = key.parse::<DomainArea>().map_err(DomainError::database)?;
            let summary = summary
                .as_str()
                .ok_or_else(|| DomainError::database(format!("Summary for {} is not text", key)))?;
            Ok((domain, summary.to_string()))
        })
        .collect()
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(row_error("id"))?;
    let email: String = row.try_get("email").map_err(row_error("email"))?;
    let token_hash: String = row
        .try_get("recovery_token_hash")
        .map_err(row_error("recovery_token_hash"))?;

    let status_str: String = row.try_get("status").map_err(row_error("status"))?;
    let status = status_str
        .parse::<SessionStatus>()
        .map_err(DomainError::database)?;

    let domain_str: String = row
        .try_get("current_domain")
        .map_err(row_error("current_domain"))?;
    let current_domain = domain_str
        .parse::<DomainArea>()
        .map_err(DomainError::database)?;

    let summaries: serde_json::Value = row
        .try_get("domain_summaries")
        .map_err(row_error("domain_summaries"))?;

    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(row_error("created_at"))?;
    let updated_at: chrono::DateTime<chrono::Utc> =
        row.try_get("updated_at").map_err(row_error("updated_at"))?;
    let expires_at: chrono::DateTime<chrono::Utc> =
        row.try_get("expires_at").map_err(row_error("expires_at"))?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(id),
        email,
        token_hash,
        status,
        current_domain,
        json_to_summaries(summaries)?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        Timestamp::from_datetime(expires_at),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_round_trip_through_json() {
        let mut summaries = BTreeMap::new();
        summaries.insert(DomainArea::Market, "Large, growing".to_string());
        summaries.insert(DomainArea::Product, "Fits".to_string());

        let json = summaries_to_json(&summaries);

        assert_eq!(json["market"], "Large, growing");
        assert_eq!(json_to_summaries(json).unwrap(), summaries);
    }

    #[test]
    fn unknown_domain_key_is_rejected() {
        let json = serde_json::json!({ "weather": "sunny" });
        assert!(json_to_summaries(json).is_err());
    }
}

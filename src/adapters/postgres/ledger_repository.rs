//! PostgreSQL implementation of LedgerRepository.
//!
//! One row per (session, topic). An overwrite keeps `created_at` and `seq`,
//! so rows stay in first-capture order.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::row_error;
use crate::domain::foundation::{
    ConfidenceLevel, DomainArea, DomainError, SessionId, Timestamp,
};
use crate::domain::ledger::{CapturedInput, InputAnnotations};
use crate::ports::LedgerRepository;

const COLUMNS: &str = "session_id, topic_id, domain, response, annotations, \
                       confidence_level, confidence_rationale, created_at, updated_at";

/// PostgreSQL implementation of LedgerRepository.
#[derive(Clone)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn upsert(&self, input: &CapturedInput) -> Result<CapturedInput, DomainError> {
        let annotations = serde_json::to_value(&input.annotations)
            .map_err(|e| DomainError::database(format!("Failed to encode annotations: {}", e)))?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO captured_inputs (
                session_id, topic_id, domain, response, annotations,
                confidence_level, confidence_rationale, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id, topic_id) DO UPDATE SET
                domain = EXCLUDED.domain,
                response = EXCLUDED.response,
                annotations = EXCLUDED.annotations,
                confidence_level = EXCLUDED.confidence_level,
                confidence_rationale = EXCLUDED.confidence_rationale,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(input.session_id.as_uuid())
        .bind(&input.topic_id)
        .bind(input.domain.as_str())
        .bind(&input.response)
        .bind(annotations)
        .bind(input.confidence_level.as_str())
        .bind(&input.confidence_rationale)
        .bind(input.created_at.as_datetime())
        .bind(input.updated_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert captured input: {}", e)))?;

        row_to_input(row)
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
        domain: Option<DomainArea>,
    ) -> Result<Vec<CapturedInput>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM captured_inputs
            WHERE session_id = $1 AND ($2::TEXT IS NULL OR domain = $2)
            ORDER BY seq
            "#,
            COLUMNS
        ))
        .bind(session_id.as_uuid())
        .bind(domain.map(|d| d.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list captured inputs: {}", e)))?;

        rows.into_iter().map(row_to_input).collect()
    }
}

fn row_to_input(row: sqlx::postgres::PgRow) -> Result<CapturedInput, DomainError> {
    let session_id: uuid::Uuid = row.try_get("session_id").map_err(row_error("session_id"))?;
    let topic_id: String = row.try_get("topic_id").map_err(row_error("topic_id"))?;
    let domain: String = row.try_get("domain").map_err(row_error("domain"))?;
    let response: String = row.try_get("response").map_err(row_error("response"))?;
    let annotations: serde_json::Value =
        row.try_get("annotations").map_err(row_error("annotations"))?;
    let level: String = row
        .try_get("confidence_level")
        .map_err(row_error("confidence_level"))?;
    let rationale: String = row
        .try_get("confidence_rationale")
        .map_err(row_error("confidence_rationale"))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(row_error("created_at"))?;
    let updated_at: chrono::DateTime<chrono::Utc> =
        row.try_get("updated_at").map_err(row_error("updated_at"))?;

    Ok(CapturedInput {
        session_id: SessionId::from_uuid(session_id),
        domain: domain.parse::<DomainArea>().map_err(DomainError::database)?,
        topic_id,
        response,
        annotations: InputAnnotations::from_json(annotations).unwrap_or_default(),
        confidence_level: level
            .parse::<ConfidenceLevel>()
            .map_err(DomainError::database)?,
        confidence_rationale: rationale,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

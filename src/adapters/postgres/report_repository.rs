//! PostgreSQL implementation of ReportRepository.
//!
//! The whole report is stored as JSONB; a regeneration replaces the row.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::row_error;
use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::synthesis::ReadinessReport;
use crate::ports::ReportRepository;

/// PostgreSQL implementation of ReportRepository.
#[derive(Clone)]
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn save(&self, report: &ReadinessReport) -> Result<(), DomainError> {
        let body = serde_json::to_value(report)
            .map_err(|e| DomainError::database(format!("Failed to encode report: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO readiness_reports (session_id, report, generated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE SET
                report = EXCLUDED.report,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(report.session_id.as_uuid())
        .bind(body)
        .bind(report.generated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save report: {}", e)))?;

        Ok(())
    }

    async fn find_latest(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ReadinessReport>, DomainError> {
        let row = sqlx::query("SELECT report FROM readiness_reports WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch report: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: serde_json::Value = row.try_get("report").map_err(row_error("report"))?;
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| DomainError::database(format!("Stored report is malformed: {}", e)))
    }
}

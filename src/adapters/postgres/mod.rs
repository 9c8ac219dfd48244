//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - Session aggregates
//! - `PostgresLedgerRepository` - Captured inputs, upserted per (session, topic)
//! - `PostgresConversationRepository` - Conversation log
//! - `PostgresReportRepository` - Latest report per session

mod conversation_repository;
mod ledger_repository;
mod report_repository;
mod session_repository;

pub use conversation_repository::PostgresConversationRepository;
pub use ledger_repository::PostgresLedgerRepository;
pub use report_repository::PostgresReportRepository;
pub use session_repository::PostgresSessionRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool sized from configuration.
pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "connected to PostgreSQL"
    );
    Ok(pool)
}

/// Applies the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Maps a column read failure to a database error.
pub(crate) fn row_error(column: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to get {}: {}", column, e))
}

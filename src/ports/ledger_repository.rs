//! Ledger repository port.
//!
//! Storage for captured inputs with a unique key on (session_id, topic_id).

use crate::domain::foundation::{DomainArea, DomainError, SessionId};
use crate::domain::ledger::CapturedInput;
use async_trait::async_trait;

/// Repository port for the topic coverage ledger.
///
/// Implementations must guarantee:
/// - at most one row per (session_id, topic_id)
/// - an overwrite keeps the row's original `created_at`
/// - listing returns rows ordered by `created_at`
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Inserts or overwrites the row for (session, topic) and returns the
    /// stored row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(&self, input: &CapturedInput) -> Result<CapturedInput, DomainError>;

    /// Lists a session's rows in insertion order, optionally for one domain.
    async fn list_by_session(
        &self,
        session_id: &SessionId,
        domain: Option<DomainArea>,
    ) -> Result<Vec<CapturedInput>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LedgerRepository) {}
    }
}

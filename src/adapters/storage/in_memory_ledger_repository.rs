//! In-Memory Ledger Repository
//!
//! Keeps each session's captured inputs in insertion order. An overwrite
//! replaces the row in place, so its position never changes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainArea, DomainError, SessionId};
use crate::domain::ledger::CapturedInput;
use crate::ports::LedgerRepository;

/// In-memory storage for captured inputs
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerRepository {
    rows: Arc<RwLock<HashMap<SessionId, Vec<CapturedInput>>>>,
}

impl InMemoryLedgerRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all sessions
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn upsert(&self, input: &CapturedInput) -> Result<CapturedInput, DomainError> {
        let mut rows = self.rows.write().await;
        let session_rows = rows.entry(input.session_id).or_default();

        match session_rows.iter_mut().find(|row| row.same_key(input)) {
            Some(existing) => {
                existing.overwrite_with(input.clone());
                Ok(existing.clone())
            }
            None => {
                session_rows.push(input.clone());
                Ok(input.clone())
            }
        }
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
        domain: Option<DomainArea>,
    ) -> Result<Vec<CapturedInput>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(session_id)
            .map(|session_rows| {
                session_rows
                    .iter()
                    .filter(|row| domain.map_or(true, |d| row.domain == d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConfidenceLevel;
    use crate::domain::ledger::InputAnnotations;
    use proptest::prelude::*;

    fn input(session: SessionId, domain: DomainArea, topic: &str, response: &str) -> CapturedInput {
        CapturedInput::new(
            session,
            domain,
            topic,
            response,
            ConfidenceLevel::Medium,
            "estimate",
            InputAnnotations::default(),
        )
    }

    #[tokio::test]
    async fn overwrite_keeps_position_and_created_at() {
        let repo = InMemoryLedgerRepository::new();
        let session = SessionId::new();

        let first = repo
            .upsert(&input(session, DomainArea::Market, "market_size", "v1"))
            .await
            .unwrap();
        repo.upsert(&input(session, DomainArea::Market, "market_timing", "v1"))
            .await
            .unwrap();
        let replaced = repo
            .upsert(&input(session, DomainArea::Market, "market_size", "v2"))
            .await
            .unwrap();

        assert_eq!(replaced.created_at, first.created_at);
        let rows = repo.list_by_session(&session, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic_id, "market_size");
        assert_eq!(rows[0].response, "v2");
    }

    #[tokio::test]
    async fn list_filters_by_domain_and_session() {
        let repo = InMemoryLedgerRepository::new();
        let session = SessionId::new();
        repo.upsert(&input(session, DomainArea::Market, "market_size", "a"))
            .await
            .unwrap();
        repo.upsert(&input(session, DomainArea::Product, "product_roadmap", "b"))
            .await
            .unwrap();
        repo.upsert(&input(SessionId::new(), DomainArea::Market, "market_size", "c"))
            .await
            .unwrap();

        let product = repo
            .list_by_session(&session, Some(DomainArea::Product))
            .await
            .unwrap();
        assert_eq!(product.len(), 1);
        assert_eq!(product[0].topic_id, "product_roadmap");
        assert_eq!(repo.list_by_session(&session, None).await.unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn replayed_writes_never_duplicate(topics in proptest::collection::vec(0usize..5, 0..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let repo = InMemoryLedgerRepository::new();
                let session = SessionId::new();
                let ids = ["target_customer", "market_size", "competitive_landscape", "customer_validation", "market_timing"];

                for index in &topics {
                    repo.upsert(&input(session, DomainArea::Market, ids[*index], "answer"))
                        .await
                        .unwrap();
                }

                let rows = repo.list_by_session(&session, None).await.unwrap();
                let mut distinct: Vec<_> = topics.clone();
                distinct.sort();
                distinct.dedup();
                assert_eq!(rows.len(), distinct.len());
                assert!(rows.len() <= 25);
            });
        }
    }
}

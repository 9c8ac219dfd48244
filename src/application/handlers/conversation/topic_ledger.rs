//! Topic coverage ledger service.
//!
//! Wraps the `LedgerRepository` with registry validation so no row can
//! reference a topic outside its domain.

use std::sync::Arc;

use crate::domain::foundation::{AssessmentError, DomainArea, SessionId};
use crate::domain::ledger::{covered_topic_ids, uncovered_topic_ids, CapturedInput};
use crate::domain::registry::TopicRegistry;
use crate::ports::LedgerRepository;

#[derive(Clone)]
pub struct TopicLedger {
    repository: Arc<dyn LedgerRepository>,
}

impl TopicLedger {
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self { repository }
    }

    /// Checks that `topic_id` belongs to `domain`.
    ///
    /// # Errors
    ///
    /// - `InvalidTopic` listing the domain's valid topic ids
    pub fn validate_topic(domain: DomainArea, topic_id: &str) -> Result<(), AssessmentError> {
        let registry = TopicRegistry::global();
        if registry.is_member(domain, topic_id) {
            return Ok(());
        }
        Err(AssessmentError::InvalidTopic {
            domain,
            topic_id: topic_id.to_string(),
            valid_topic_ids: registry
                .topic_ids(domain)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    /// Inserts or overwrites the (session, topic) row.
    pub async fn upsert(&self, input: CapturedInput) -> Result<CapturedInput, AssessmentError> {
        Self::validate_topic(input.domain, &input.topic_id)?;
        let stored = self.repository.upsert(&input).await?;
        tracing::debug!(
            session_id = %stored.session_id,
            domain = %stored.domain,
            topic_id = %stored.topic_id,
            confidence = %stored.confidence_level,
            "ledger row written"
        );
        Ok(stored)
    }

    /// Rows of a session in insertion order, optionally for one domain.
    pub async fn query(
        &self,
        session_id: &SessionId,
        domain: Option<DomainArea>,
    ) -> Result<Vec<CapturedInput>, AssessmentError> {
        Ok(self.repository.list_by_session(session_id, domain).await?)
    }

    pub async fn covered_topic_ids(
        &self,
        session_id: &SessionId,
        domain: DomainArea,
    ) -> Result<Vec<String>, AssessmentError> {
        let rows = self.query(session_id, Some(domain)).await?;
        Ok(covered_topic_ids(&rows, domain))
    }

    pub async fn uncovered_topic_ids(
        &self,
        session_id: &SessionId,
        domain: DomainArea,
    ) -> Result<Vec<String>, AssessmentError> {
        let rows = self.query(session_id, Some(domain)).await?;
        Ok(uncovered_topic_ids(&rows, domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryLedgerRepository;
    use crate::domain::foundation::ConfidenceLevel;
    use crate::domain::ledger::InputAnnotations;

    fn row(session_id: SessionId, domain: DomainArea, topic: &str, response: &str) -> CapturedInput {
        CapturedInput::new(
            session_id,
            domain,
            topic,
            response,
            ConfidenceLevel::Medium,
            "estimate",
            InputAnnotations::default(),
        )
    }

    #[tokio::test]
    async fn rejects_topic_outside_domain() {
        let ledger = TopicLedger::new(Arc::new(InMemoryLedgerRepository::new()));
        let err = ledger
            .upsert(row(SessionId::new(), DomainArea::Market, "cash_runway", "6 months"))
            .await
            .unwrap_err();

        match err {
            AssessmentError::InvalidTopic {
                valid_topic_ids, ..
            } => {
                assert_eq!(valid_topic_ids.len(), 5);
                assert_eq!(valid_topic_ids[0], "target_customer");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn replayed_upsert_overwrites_in_place() {
        let ledger = TopicLedger::new(Arc::new(InMemoryLedgerRepository::new()));
        let session = SessionId::new();

        ledger
            .upsert(row(session, DomainArea::Market, "market_size", "first"))
            .await
            .unwrap();
        ledger
            .upsert(row(session, DomainArea::Market, "target_customer", "clinics"))
            .await
            .unwrap();
        ledger
            .upsert(row(session, DomainArea::Market, "market_size", "second"))
            .await
            .unwrap();

        let rows = ledger.query(&session, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic_id, "market_size");
        assert_eq!(rows[0].response, "second");
    }

    #[tokio::test]
    async fn coverage_follows_registry_order() {
        let ledger = TopicLedger::new(Arc::new(InMemoryLedgerRepository::new()));
        let session = SessionId::new();
        for topic in ["market_timing", "target_customer"] {
            ledger
                .upsert(row(session, DomainArea::Market, topic, "answer"))
                .await
                .unwrap();
        }

        let covered = ledger.covered_topic_ids(&session, DomainArea::Market).await.unwrap();
        let uncovered = ledger
            .uncovered_topic_ids(&session, DomainArea::Market)
            .await
            .unwrap();

        assert_eq!(covered, vec!["target_customer", "market_timing"]);
        assert_eq!(
            uncovered,
            vec!["market_size", "competitive_landscape", "customer_validation"]
        );
    }
}

//! GetProgressHandler - Query handler for coverage progress.

use serde::Serialize;
use std::sync::Arc;

use super::super::load_session;
use crate::domain::foundation::{AssessmentError, DomainArea, Percentage, SessionId, SessionStatus};
use crate::domain::ledger::{covered_topic_ids, distinct_covered, CapturedInput};
use crate::domain::registry::TopicRegistry;
use crate::domain::session::Session;
use crate::ports::{LedgerRepository, SessionRepository};

/// Query for a session's progress.
#[derive(Debug, Clone)]
pub struct GetProgressQuery {
    pub session_id: SessionId,
}

/// Coverage of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainProgress {
    pub domain: DomainArea,
    pub label: &'static str,
    pub covered: usize,
    pub total: usize,
}

/// Read model returned by progress and resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub current_domain: DomainArea,
    pub domains: Vec<DomainProgress>,
    pub topics_captured: usize,
    pub topics_total: usize,
    pub coverage_percentage: Percentage,
}

impl ProgressView {
    /// Builds the view from a session and its ledger rows.
    pub fn from_ledger(session: &Session, inputs: &[CapturedInput]) -> Self {
        let registry = TopicRegistry::global();
        let domains = DomainArea::ALL
            .iter()
            .map(|&domain| DomainProgress {
                domain,
                label: domain.label(),
                covered: covered_topic_ids(inputs, domain).len(),
                total: registry.topics_for(domain).len(),
            })
            .collect();
        let topics_captured = distinct_covered(inputs);
        let topics_total = registry.total_topics();

        Self {
            session_id: *session.id(),
            status: session.status(),
            current_domain: session.current_domain(),
            domains,
            topics_captured,
            topics_total,
            coverage_percentage: Percentage::of(topics_captured, topics_total),
        }
    }
}

/// Handler for progress queries. Reads are allowed on expired sessions.
pub struct GetProgressHandler {
    sessions: Arc<dyn SessionRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl GetProgressHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { sessions, ledger }
    }

    pub async fn handle(&self, query: GetProgressQuery) -> Result<ProgressView, AssessmentError> {
        let session = load_session(self.sessions.as_ref(), &query.session_id).await?;
        let inputs = self.ledger.list_by_session(&query.session_id, None).await?;
        Ok(ProgressView::from_ledger(&session, &inputs))
    }
}

//! In-Memory Report Repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::synthesis::ReadinessReport;
use crate::ports::ReportRepository;

/// Latest report per session, in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportRepository {
    reports: Arc<RwLock<HashMap<SessionId, ReadinessReport>>>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn save(&self, report: &ReadinessReport) -> Result<(), DomainError> {
        self.reports
            .write()
            .await
            .insert(report.session_id, report.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ReadinessReport>, DomainError> {
        Ok(self.reports.read().await.get(session_id).cloned())
    }
}

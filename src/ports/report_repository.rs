//! Report repository port.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::synthesis::ReadinessReport;
use async_trait::async_trait;

/// Stores the latest readiness report per session.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Saves a report, replacing any earlier one for the same session.
    async fn save(&self, report: &ReadinessReport) -> Result<(), DomainError>;

    /// Returns the latest report for a session.
    async fn find_latest(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ReadinessReport>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ReportRepository) {}
    }
}

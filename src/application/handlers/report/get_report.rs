//! GetReportHandler - latest persisted report of a session.

use std::sync::Arc;

use super::super::load_session;
use crate::domain::foundation::{AssessmentError, ErrorCode, SessionId};
use crate::domain::synthesis::ReadinessReport;
use crate::ports::{ReportRepository, SessionRepository};

#[derive(Debug, Clone)]
pub struct GetReportQuery {
    pub session_id: SessionId,
}

pub struct GetReportHandler {
    sessions: Arc<dyn SessionRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl GetReportHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, reports: Arc<dyn ReportRepository>) -> Self {
        Self { sessions, reports }
    }

    pub async fn handle(&self, query: GetReportQuery) -> Result<ReadinessReport, AssessmentError> {
        load_session(self.sessions.as_ref(), &query.session_id).await?;
        self.reports
            .find_latest(&query.session_id)
            .await?
            .ok_or_else(|| {
                AssessmentError::conflict(
                    ErrorCode::ReportNotFound,
                    format!("No report generated for session {}", query.session_id),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{InMemoryReportRepository, InMemorySessionRepository};
    use crate::domain::session::Session;

    #[tokio::test]
    async fn missing_report_is_report_not_found() {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let (session, _) = Session::start("founder@example.com", 30).unwrap();
        sessions.save(&session).await.unwrap();
        let handler = GetReportHandler::new(sessions, Arc::new(InMemoryReportRepository::new()));

        let err = handler
            .handle(GetReportQuery {
                session_id: *session.id(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ReportNotFound);
    }
}

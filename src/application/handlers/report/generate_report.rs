//! GenerateReportHandler - deterministic synthesis plus advisory narrative.

use std::sync::Arc;

use super::super::load_session;
use super::NarrativeGenerator;
use crate::domain::foundation::{AssessmentError, SessionId, SessionStatus, Timestamp};
use crate::domain::session::Session;
use crate::domain::synthesis::{ReadinessEngine, ReadinessReport};
use crate::ports::{LedgerRepository, ReportRepository, SessionRepository};

/// Command to generate (or regenerate) a report.
#[derive(Debug, Clone)]
pub struct GenerateReportCommand {
    pub session_id: SessionId,
}

/// Handler for report generation.
pub struct GenerateReportHandler {
    sessions: Arc<dyn SessionRepository>,
    ledger: Arc<dyn LedgerRepository>,
    reports: Arc<dyn ReportRepository>,
    narrative: NarrativeGenerator,
}

impl GenerateReportHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        ledger: Arc<dyn LedgerRepository>,
        reports: Arc<dyn ReportRepository>,
        narrative: NarrativeGenerator,
    ) -> Self {
        Self {
            sessions,
            ledger,
            reports,
            narrative,
        }
    }

    /// Scores the ledger and persists the report.
    ///
    /// On a narrative failure nothing is persisted and the session stays in
    /// `synthesizing`; calling again retries.
    pub async fn handle(
        &self,
        cmd: GenerateReportCommand,
    ) -> Result<ReadinessReport, AssessmentError> {
        // 1. Load and guard session
        let mut session = load_session(self.sessions.as_ref(), &cmd.session_id).await?;
        session.ensure_writable(&Timestamp::now())?;

        // 2. Snapshot the ledger
        let inputs = self.ledger.list_by_session(&cmd.session_id, None).await?;
        if inputs.is_empty() {
            return Err(AssessmentError::NoInputsCaptured(cmd.session_id));
        }

        // 3. Deterministic verdicts
        self.advance(&mut session, SessionStatus::Validating).await?;
        let assessment = ReadinessEngine::assess(&inputs);
        self.advance(&mut session, SessionStatus::Synthesizing).await?;

        // 4. Advisory narrative
        let parsed = self.narrative.generate(&assessment, &inputs).await?;

        // 5. Persist and complete
        let report = ReadinessReport::new(cmd.session_id, assessment, parsed.narrative);
        self.reports.save(&report).await?;
        self.advance(&mut session, SessionStatus::Completed).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            assessment_status = report.assessment.assessment_status.as_str(),
            readiness = ?report.assessment.readiness_level,
            positioning = ?report.assessment.expansion_positioning,
            "readiness report generated"
        );
        Ok(report)
    }

    async fn advance(
        &self,
        session: &mut Session,
        target: SessionStatus,
    ) -> Result<(), AssessmentError> {
        if session.advance_status(target)? {
            self.sessions.update(session).await?;
        }
        Ok(())
    }
}

//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.
//!
//! - `session` - create, resume, abandon, progress
//! - `conversation` - streamed interview turns and the tool surface
//! - `report` - readiness synthesis and retrieval

pub mod conversation;
pub mod report;
pub mod session;

pub use conversation::{
    AssessmentTools, ConfidenceClassifier, StartTurnCommand, StartTurnHandler, TopicLedger,
    TurnConfig, TurnEventStream, TurnGate,
};
pub use report::{
    GenerateReportCommand, GenerateReportHandler, GetReportHandler, GetReportQuery,
    NarrativeGenerator,
};
pub use session::{
    AbandonSessionCommand, AbandonSessionHandler, CreateSessionCommand, CreateSessionHandler,
    CreateSessionResult, DomainProgress, GetProgressHandler, GetProgressQuery, ProgressView,
    ResumeSessionCommand, ResumeSessionHandler,
};

use crate::domain::foundation::{AssessmentError, SessionId};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// Loads a session or fails with `NotFound`.
pub(crate) async fn load_session(
    repo: &dyn SessionRepository,
    id: &SessionId,
) -> Result<Session, AssessmentError> {
    repo.find_by_id(id).await?.ok_or(AssessmentError::NotFound(*id))
}

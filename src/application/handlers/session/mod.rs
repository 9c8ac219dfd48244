//! Session command and query handlers.

mod abandon_session;
mod create_session;
mod get_progress;
mod resume_session;

pub use abandon_session::{AbandonSessionCommand, AbandonSessionHandler};
pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use get_progress::{DomainProgress, GetProgressHandler, GetProgressQuery, ProgressView};
pub use resume_session::{ResumeSessionCommand, ResumeSessionHandler};

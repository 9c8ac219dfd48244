//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) live side by side per
//! concern.

pub mod handlers;

pub use handlers::{
    // Session handlers
    AbandonSessionCommand, AbandonSessionHandler, CreateSessionCommand, CreateSessionHandler,
    CreateSessionResult, GetProgressHandler, GetProgressQuery, ProgressView,
    ResumeSessionCommand, ResumeSessionHandler,
    // Conversation
    StartTurnCommand, StartTurnHandler, TurnConfig, TurnEventStream,
    // Reports
    GenerateReportCommand, GenerateReportHandler, GetReportHandler, GetReportQuery,
};

//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Session aggregates
//! - `LedgerRepository` - Captured inputs, unique per (session, topic)
//! - `ConversationRepository` - Conversation log
//! - `ReportRepository` - Latest readiness report per session
//!
//! ## Delegate Ports
//!
//! - `DialogueProvider` - Streaming dialogue with tool calls
//! - `StructuredOutputProvider` - Schema-shaped JSON generation

mod ai_provider;
mod conversation_repository;
mod ledger_repository;
mod report_repository;
mod session_repository;

pub use ai_provider::{
    AIError, DialogueEvent, DialogueProvider, DialogueRequest, DialogueStream, Message,
    MessageRole, ProviderInfo, StructuredOutputProvider, StructuredRequest,
};
pub use conversation_repository::ConversationRepository;
pub use ledger_repository::LedgerRepository;
pub use report_repository::ReportRepository;
pub use session_repository::SessionRepository;

//! Storage adapters - in-memory repository implementations.
//!
//! Used by tests and when no database URL is configured.

mod in_memory_conversation_repository;
mod in_memory_ledger_repository;
mod in_memory_report_repository;
mod in_memory_session_repository;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
pub use in_memory_ledger_repository::InMemoryLedgerRepository;
pub use in_memory_report_repository::InMemoryReportRepository;
pub use in_memory_session_repository::InMemorySessionRepository;

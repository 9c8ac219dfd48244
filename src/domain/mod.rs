//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `registry` - The fixed catalogue of domains and topics
//! - `session` - Assessment session lifecycle and the domain pointer
//! - `ledger` - Captured inputs, one per (session, topic)
//! - `confidence` - Confidence labels and the pattern tier
//! - `conversation` - Tool protocol, turn events and prompts
//! - `synthesis` - Pure readiness scoring and report types

pub mod confidence;
pub mod conversation;
pub mod foundation;
pub mod ledger;
pub mod registry;
pub mod session;
pub mod synthesis;

//! Conversation handlers - the interview turn and the services it drives.
//!
//! - `ConfidenceClassifier` - hint, pattern, delegate tiers plus annotation extraction
//! - `TopicLedger` - registry-validated ledger writes
//! - `AssessmentTools` - server-side `capture_input` / `transition_domain`
//! - `TurnGate` - one active turn per session
//! - `StartTurnHandler` - streams a turn as ordered events

mod assessment_tools;
mod confidence_classifier;
mod start_turn;
mod topic_ledger;
mod turn_gate;

pub use assessment_tools::{AssessmentTools, ToolOutcome, TurnToolState};
pub use confidence_classifier::ConfidenceClassifier;
pub use start_turn::{StartTurnCommand, StartTurnHandler, TurnConfig, TurnEventStream};
pub use topic_ledger::TopicLedger;
pub use turn_gate::{TurnGate, TurnPermit};

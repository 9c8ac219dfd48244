//! Topic Coverage Ledger - domain types.
//!
//! The ledger holds at most one [`CapturedInput`] per (session, topic).
//! Persistence goes through [`crate::ports::LedgerRepository`]; membership
//! checks live in the application layer's `TopicLedger`.

mod annotations;
mod captured_input;
mod coverage;

pub use annotations::{truncate_chars, InputAnnotations};
pub use captured_input::CapturedInput;
pub use coverage::{covered_topic_ids, distinct_covered, uncovered_topic_ids};

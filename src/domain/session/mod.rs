//! Session module - assessment session lifecycle.
//!
//! The session owns the interview's single domain pointer and its status.
//! Captured answers live in the ledger, not on the session.

mod aggregate;
mod recovery;

pub use aggregate::{DomainTransition, Session, MAX_EMAIL_LENGTH};
pub use recovery::{hash_token, verify_token, RecoveryToken};

//! Single-active-turn gate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::SessionId;

/// Tracks sessions with a running turn. Cloning shares the set.
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    active: Arc<Mutex<HashSet<SessionId>>>,
}

/// Held for the lifetime of a turn; releases the session on drop.
#[derive(Debug)]
pub struct TurnPermit {
    gate: TurnGate,
    session_id: SessionId,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session, or returns `None` while another turn holds it.
    pub fn try_acquire(&self, session_id: SessionId) -> Option<TurnPermit> {
        if !self.lock().insert(session_id) {
            return None;
        }
        Some(TurnPermit {
            gate: self.clone(),
            session_id,
        })
    }

    pub fn is_active(&self, session_id: &SessionId) -> bool {
        self.lock().contains(session_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SessionId>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for TurnPermit {
    fn drop(&mut self) {
        self.gate.lock().remove(&self.session_id);
    }
}

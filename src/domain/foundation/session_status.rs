//! SessionStatus enum for tracking lifecycle of assessment sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an assessment session.
///
/// Statuses are ranked; a session only moves to a higher rank, except that
/// any non-terminal session may be abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Started,
    InProgress,
    Validating,
    Synthesizing,
    Completed,
    Abandoned,
}

impl SessionStatus {
    fn rank(&self) -> u8 {
        match self {
            SessionStatus::Started => 0,
            SessionStatus::InProgress => 1,
            SessionStatus::Validating => 2,
            SessionStatus::Synthesizing => 3,
            SessionStatus::Completed => 4,
            SessionStatus::Abandoned => 5,
        }
    }

    /// Returns true if the session accepts no further writes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Abandoned)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - any status -> a strictly later status (excluding Abandoned)
    /// - any non-abandoned status -> Abandoned
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match target {
            SessionStatus::Abandoned => true,
            _ => target.rank() > self.rank(),
        }
    }

    /// Returns true if `self` is at or beyond `other` in the lifecycle.
    pub fn has_reached(&self, other: &SessionStatus) -> bool {
        self.rank() >= other.rank()
    }

    /// Returns the snake_case storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Started => "started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Validating => "validating",
            SessionStatus::Synthesizing => "synthesizing",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(SessionStatus::Started),
            "in_progress" => Ok(SessionStatus::InProgress),
            "validating" => Ok(SessionStatus::Validating),
            "synthesizing" => Ok(SessionStatus::Synthesizing),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

//! Stored conversation log entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, SessionId, Timestamp};

/// Author of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredRole {
    User,
    Assistant,
    /// Server-written record of tool outcomes in a turn.
    ToolNote,
}

impl StoredRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoredRole::User => "user",
            StoredRole::Assistant => "assistant",
            StoredRole::ToolNote => "tool_note",
        }
    }
}

impl std::str::FromStr for StoredRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(StoredRole::User),
            "assistant" => Ok(StoredRole::Assistant),
            "tool_note" => Ok(StoredRole::ToolNote),
            other => Err(format!("unknown message role: {}", other)),
        }
    }
}

/// A message in a session's conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub session_id: SessionId,
    pub role: StoredRole,
    pub content: String,
    pub created_at: Timestamp,
}

impl StoredMessage {
    pub fn new(session_id: SessionId, role: StoredRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            role,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    pub fn user(session_id: SessionId, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::User, content)
    }

    pub fn assistant(session_id: SessionId, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::Assistant, content)
    }

    pub fn tool_note(session_id: SessionId, content: impl Into<String>) -> Self {
        Self::new(session_id, StoredRole::ToolNote, content)
    }
}

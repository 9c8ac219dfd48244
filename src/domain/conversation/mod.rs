//! Conversation - the tool-calling protocol between the dialogue delegate
//! and the assessment state.
//!
//! # Module Organization
//!
//! - `definitions` - `capture_input` / `transition_domain` schemas and params
//! - `events` - ordered turn events
//! - `message` - stored conversation log entries
//! - `prompts` - interview prompt text
//! - `tool_call` / `tool_definition` - generic tool value objects

mod definitions;
mod events;
mod message;
mod prompts;
mod tool_call;
mod tool_definition;

pub use definitions::{
    assessment_tools, capture_input_tool, transition_domain_tool, CaptureInputParams,
    CaptureInputResult, TransitionDomainParams, TransitionDomainResult, CAPTURE_INPUT,
    TRANSITION_DOMAIN,
};
pub use events::TurnEvent;
pub use message::{StoredMessage, StoredRole};
pub use prompts::{follow_up_prompt, interview_system_prompt};
pub use tool_call::{ToolCall, ToolResponse};
pub use tool_definition::ToolDefinition;

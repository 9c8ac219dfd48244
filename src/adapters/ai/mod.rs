//! AI Provider Adapters.
//!
//! Implementations of the dialogue and structured-output ports.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing and keyless development
//! - `AnthropicProvider` - Anthropic Claude models via the Messages API

mod anthropic_provider;
mod mock_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockAIProvider, MockDialogue, MockError, MockStep};

//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Model used for dialogue, classification and narrative
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the Anthropic base URL
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Which delegate implementation to wire at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Anthropic,
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Picks the provider for `environment`.
    ///
    /// Without a key only development falls back to the mock.
    pub fn provider_choice(&self, environment: Environment) -> Result<ProviderChoice, ValidationError> {
        if self.has_anthropic() {
            return Ok(ProviderChoice::Anthropic);
        }
        match environment {
            Environment::Development => Ok(ProviderChoice::Mock),
            _ => Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY")),
        }
    }

    /// Validate AI configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidAiTimeout);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI_MODEL"));
        }
        self.provider_choice(environment)?;
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.timeout_secs, 120);
        assert!(!config.has_anthropic());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_anthropic());
    }

    #[test]
    fn test_missing_key_uses_mock_in_development() {
        let config = AiConfig::default();
        assert_eq!(
            config.provider_choice(Environment::Development).unwrap(),
            ProviderChoice::Mock
        );
        assert!(config.validate(Environment::Development).is_ok());
    }

    #[test]
    fn test_missing_key_fails_outside_development() {
        let config = AiConfig::default();
        assert!(config.provider_choice(Environment::Staging).is_err());
        assert!(config.validate(Environment::Production).is_err());
    }

    #[test]
    fn test_key_selects_anthropic() {
        let config = AiConfig {
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            ..Default::default()
        };
        assert_eq!(
            config.provider_choice(Environment::Production).unwrap(),
            ProviderChoice::Anthropic
        );
    }

    #[test]
    fn test_validation_timeout_bounds() {
        let config = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate(Environment::Development).is_err());
    }
}

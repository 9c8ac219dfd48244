//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `EXPANSION_READINESS` prefix and nested values use double underscores.
//!
//! # Example
//!
//! ```no_run
//! use expansion_readiness::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod assessment;
mod database;
mod error;
mod server;

pub use ai::{AiConfig, ProviderChoice};
pub use assessment::AssessmentConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development setup (in-memory storage, mock delegates).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (optional PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// AI delegate configuration (Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Session and turn tunables
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `EXPANSION_READINESS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `EXPANSION_READINESS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EXPANSION_READINESS__ASSESSMENT__SESSION_TTL_DAYS=14` -> `assessment.session_ttl_days = 14`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EXPANSION_READINESS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate(self.server.environment)?;
        self.assessment.validate()?;
        if self.server.report_timeout_secs <= self.ai.timeout_secs {
            return Err(ValidationError::ReportTimeoutTooShort {
                report_secs: self.server.report_timeout_secs,
                ai_secs: self.ai.timeout_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "EXPANSION_READINESS__DATABASE__URL",
        "EXPANSION_READINESS__AI__ANTHROPIC_API_KEY",
        "EXPANSION_READINESS__SERVER__PORT",
        "EXPANSION_READINESS__SERVER__ENVIRONMENT",
        "EXPANSION_READINESS__ASSESSMENT__SESSION_TTL_DAYS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_loads_development_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert!(!config.database.is_configured());
        assert_eq!(config.assessment.session_ttl_days, 30);
        assert_eq!(
            config.ai.provider_choice(config.server.environment).unwrap(),
            ProviderChoice::Mock
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EXPANSION_READINESS__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("EXPANSION_READINESS__ASSESSMENT__SESSION_TTL_DAYS", "14");
        env::set_var("EXPANSION_READINESS__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url(), Some("postgresql://test@localhost/test"));
        assert_eq!(config.assessment.session_ttl_days, 14);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_production_requires_api_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EXPANSION_READINESS__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_with_key_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EXPANSION_READINESS__SERVER__ENVIRONMENT", "production");
        env::set_var("EXPANSION_READINESS__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.ai.provider_choice(config.server.environment).unwrap(),
            ProviderChoice::Anthropic
        );
    }

    #[test]
    fn test_report_timeout_must_outlast_ai_timeout() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.server.report_timeout_secs = config.ai.timeout_secs;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ReportTimeoutTooShort { .. })
        ));
    }
}

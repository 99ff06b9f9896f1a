//! Application configuration module
//!
//! Typed configuration loaded from environment variables with the `config`
//! and `dotenvy` crates. Variables use the `SUPPORT_CHAT` prefix and `__`
//! between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use support_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod crm;
mod database;
mod error;
mod extraction;
mod retrieval;
mod server;

pub use ai::AiConfig;
pub use crm::CrmConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use extraction::ExtractionConfig;
pub use retrieval::RetrievalConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Generation model (OpenAI) and outbound proxy
    pub ai: AiConfig,

    /// Vector store, embeddings and ranking
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Lead forwarding (Bitrix24)
    #[serde(default)]
    pub crm: CrmConfig,

    /// Name-extraction word list overrides
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUPPORT_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `SUPPORT_CHAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUPPORT_CHAT__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUPPORT_CHAT")
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
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.retrieval.validate()?;
        self.crm.validate()?;
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
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SUPPORT_CHAT__DATABASE__URL",
        "SUPPORT_CHAT__AI__OPENAI_API_KEY",
        "SUPPORT_CHAT__SERVER__PORT",
        "SUPPORT_CHAT__SERVER__ENVIRONMENT",
        "SUPPORT_CHAT__RETRIEVAL__TOP_K",
        "SUPPORT_CHAT__CRM__BITRIX24_WEBHOOK_URL",
    ];

    fn set_minimal_env() {
        env::set_var("SUPPORT_CHAT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("SUPPORT_CHAT__AI__OPENAI_API_KEY", "sk-test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.url.expose_secret(),
            "postgresql://test@localhost/test"
        );
        assert!(config.validate().is_ok());
        assert!(!config.crm.is_enabled());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.retrieval.collection, "knowledge_base");
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUPPORT_CHAT__SERVER__ENVIRONMENT", "production");
        env::set_var("SUPPORT_CHAT__SERVER__PORT", "3000");
        env::set_var("SUPPORT_CHAT__RETRIEVAL__TOP_K", "5");
        env::set_var(
            "SUPPORT_CHAT__CRM__BITRIX24_WEBHOOK_URL",
            "https://crm.example.com/rest/1/key",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.crm.is_enabled());
    }

    #[test]
    fn test_missing_api_key_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SUPPORT_CHAT__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}

//! Generation model configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{OpenAIConfig, ProxySettings};
use crate::domain::conversation::PromptBuilder;

/// OpenAI chat model settings plus the optional outbound proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub openai_api_key: Secret<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries inside the provider before the failover path is taken
    #[serde(default)]
    pub max_retries: u32,

    pub proxy_url: Option<String>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<Secret<String>>,

    /// Reply sent when generation fails
    #[serde(default = "default_apology")]
    pub apology: String,

    /// Replaces the built-in policy preamble; must keep the JSON reply contract
    pub system_prompt: Option<String>,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: Secret::new(api_key.into()),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: 0,
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
            apology: default_apology(),
            system_prompt: None,
        }
    }

    /// Prompt builder with the configured preamble, if any.
    pub fn prompts(&self) -> PromptBuilder {
        match self.system_prompt.as_deref().map(str::trim) {
            Some(preamble) if !preamble.is_empty() => PromptBuilder::new().with_preamble(preamble),
            _ => PromptBuilder::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Proxy settings when a proxy URL is configured.
    pub fn proxy(&self) -> Option<ProxySettings> {
        let url = self.proxy_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let proxy = ProxySettings::new(url);
        Some(match (&self.proxy_username, &self.proxy_password) {
            (Some(user), Some(pass)) if !user.is_empty() => {
                proxy.with_credentials(user.clone(), pass.expose_secret().clone())
            }
            _ => proxy,
        })
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy().is_some()
    }

    /// Provider config for the direct (unproxied) path.
    pub fn direct_provider_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.openai_api_key.expose_secret().clone())
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
            .without_proxy()
    }

    /// Provider config for the primary path, proxied when configured.
    pub fn primary_provider_config(&self) -> OpenAIConfig {
        match self.proxy() {
            Some(proxy) => self.direct_provider_config().with_proxy(proxy),
            None => self.direct_provider_config(),
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__OPENAI_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("ai.base_url"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::MustBePositive("ai.max_tokens"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("ai.timeout_secs"));
        }
        if let Some(url) = self.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.contains("://") {
                return Err(ValidationError::InvalidUrl("ai.proxy_url"));
            }
        }
        Ok(())
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout() -> u64 {
    60
}

fn default_apology() -> String {
    "Извините, произошла ошибка при обработке запроса. Попробуйте позже.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::new("sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 0);
        assert!(!config.has_proxy());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_system_prompt_overrides_preamble() {
        let mut config = AiConfig::new("sk-test");
        config.system_prompt = Some("  Custom policy  ".to_string());
        let prompt = config.prompts().turn_prompt(None, &[], &[], "Привет");
        assert!(prompt.system.starts_with("Custom policy\n\n"));

        config.system_prompt = Some("   ".to_string());
        let prompt = config.prompts().turn_prompt(None, &[], &[], "Привет");
        assert_eq!(prompt.system, PromptBuilder::new().turn_prompt(None, &[], &[], "Привет").system);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        assert!(AiConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut config = AiConfig::new("sk-test");
        config.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTemperature)));
    }

    #[test]
    fn test_proxy_with_credentials() {
        let mut config = AiConfig::new("sk-test");
        config.proxy_url = Some("http://proxy:3128".to_string());
        config.proxy_username = Some("user".to_string());
        config.proxy_password = Some(Secret::new("pass".to_string()));

        let proxy = config.proxy().unwrap();
        assert_eq!(proxy.url, "http://proxy:3128");
        assert_eq!(proxy.username.as_deref(), Some("user"));
        assert!(config.primary_provider_config().proxy.is_some());
        assert!(config.direct_provider_config().proxy.is_none());
    }

    #[test]
    fn test_blank_proxy_url_means_no_proxy() {
        let mut config = AiConfig::new("sk-test");
        config.proxy_url = Some("   ".to_string());
        assert!(!config.has_proxy());
        assert!(config.validate().is_ok());
    }
}

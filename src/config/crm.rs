//! CRM (Bitrix24) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Lead forwarding settings. Forwarding is disabled without a webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    /// Inbound webhook base, e.g. `https://example.bitrix24.ru/rest/1/abc`
    pub bitrix24_webhook_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl CrmConfig {
    pub fn webhook(&self) -> Option<&str> {
        self.bitrix24_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.webhook() {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidUrl("crm.bitrix24_webhook_url"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("crm.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            bitrix24_webhook_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

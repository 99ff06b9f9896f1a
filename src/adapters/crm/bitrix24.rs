//! Bitrix24 inbound-webhook client (`crm.lead.add`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::domain::lead::Lead;
use crate::ports::{CrmError, CrmGateway};

#[derive(Debug, Serialize)]
struct LeadRequest<'a> {
    #[serde(rename = "FIELDS")]
    fields: LeadFields<'a>,
}

#[derive(Debug, Serialize)]
struct LeadFields<'a> {
    #[serde(rename = "NAME")]
    name: &'a str,
    #[serde(rename = "PHONE")]
    phone: [PhoneEntry<'a>; 1],
    #[serde(rename = "COMMENTS", skip_serializing_if = "Option::is_none")]
    comments: Option<&'a str>,
    #[serde(rename = "SOURCE_ID")]
    source_id: &'static str,
}

#[derive(Debug, Serialize)]
struct PhoneEntry<'a> {
    #[serde(rename = "VALUE")]
    value: &'a str,
    #[serde(rename = "VALUE_TYPE")]
    value_type: &'static str,
}

impl<'a> From<&'a Lead> for LeadRequest<'a> {
    fn from(lead: &'a Lead) -> Self {
        Self {
            fields: LeadFields {
                name: &lead.name,
                phone: [PhoneEntry {
                    value: &lead.phone,
                    value_type: "WORK",
                }],
                comments: Some(lead.comments.as_str()).filter(|c| !c.is_empty()),
                source_id: "WEB",
            },
        }
    }
}

pub struct Bitrix24Gateway {
    endpoint: String,
    client: Client,
}

impl Bitrix24Gateway {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, CrmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrmError::Network(e.to_string()))?;
        Ok(Self {
            endpoint: format!("{}/crm.lead.add", webhook_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// A truthy `result` is the lead id; anything else is a rejection.
fn interpret(body: &Value) -> Result<String, CrmError> {
    match body.get("result") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Bool(true)) => Ok("true".to_string()),
        _ => {
            let reason = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            Err(CrmError::Rejected(reason.to_string()))
        }
    }
}

#[async_trait]
impl CrmGateway for Bitrix24Gateway {
    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&LeadRequest::from(lead))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CrmError::Timeout
                } else {
                    CrmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "bitrix24 returned an error status");
            return Err(CrmError::Http {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CrmError::Parse(e.to_string()))?;
        interpret(&body)
    }
}

//! LeadForwarder - hands a completed contact to the CRM.
//!
//! Failures are reported in the outcome, never raised; the caller decides
//! what to log.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::lead::Lead;
use crate::ports::CrmGateway;

/// Result of one forwarding attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ForwardOutcome {
    fn created(lead_id: String) -> Self {
        Self {
            success: true,
            lead_id: Some(lead_id),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            lead_id: None,
            error: Some(error.into()),
        }
    }
}

pub struct LeadForwarder {
    gateway: Arc<dyn CrmGateway>,
}

impl LeadForwarder {
    pub fn new(gateway: Arc<dyn CrmGateway>) -> Self {
        Self { gateway }
    }

    /// Sends one lead. Missing name or phone fails before any I/O.
    pub async fn forward(
        &self,
        name: &str,
        phone: &str,
        summary: &str,
        session_id: Option<&SessionId>,
    ) -> ForwardOutcome {
        let lead = match Lead::new(name, phone, summary, session_id) {
            Ok(lead) => lead,
            Err(err) => return ForwardOutcome::failed(format!("incomplete contact: {}", err)),
        };

        match self.gateway.create_lead(&lead).await {
            Ok(lead_id) => {
                tracing::info!(lead_id = %lead_id, phone = %lead.phone, "lead created in CRM");
                ForwardOutcome::created(lead_id)
            }
            Err(err) => ForwardOutcome::failed(err.to_string()),
        }
    }
}

//! CRM gateway port - the external system that receives completed leads.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::lead::Lead;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("CRM integration is not configured")]
    NotConfigured,

    #[error("CRM request timed out")]
    Timeout,

    #[error("CRM returned HTTP {status}")]
    Http { status: u16 },

    #[error("CRM rejected the lead: {0}")]
    Rejected(String),

    #[error("CRM network error: {0}")]
    Network(String),

    #[error("invalid CRM response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Create a lead, returning the CRM's opaque lead id.
    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmError>;
}

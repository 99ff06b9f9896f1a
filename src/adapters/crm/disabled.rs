use async_trait::async_trait;

use crate::domain::lead::Lead;
use crate::ports::{CrmError, CrmGateway};

/// Gateway used when no webhook is configured; every call fails without I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCrmGateway;

#[async_trait]
impl CrmGateway for DisabledCrmGateway {
    async fn create_lead(&self, _lead: &Lead) -> Result<String, CrmError> {
        Err(CrmError::NotConfigured)
    }
}

//! CRM gateway double that records every lead it receives.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::lead::Lead;
use crate::ports::{CrmError, CrmGateway};

#[derive(Debug, Clone, Default)]
pub struct RecordingCrmGateway {
    leads: Arc<Mutex<Vec<Lead>>>,
    fail_with: Option<String>,
}

impl RecordingCrmGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call is recorded and then rejected with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            leads: Arc::default(),
            fail_with: Some(reason.into()),
        }
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.leads.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.leads.lock().unwrap().len()
    }
}

#[async_trait]
impl CrmGateway for RecordingCrmGateway {
    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmError> {
        let count = {
            let mut leads = self.leads.lock().unwrap();
            leads.push(lead.clone());
            leads.len()
        };
        match self.fail_with {
            Some(ref reason) => Err(CrmError::Rejected(reason.clone())),
            None => Ok(count.to_string()),
        }
    }
}

//! HTTP DTOs for admin endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::contact::{Contact, ContactStatus};
use crate::domain::conversation::TurnRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct RecentMessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: ContactStatus,
    pub created_at: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.to_string(),
            status: contact.status(),
            name: contact.name,
            phone: contact.phone,
            created_at: contact.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub is_from_user: bool,
    pub created_at: String,
}

impl From<TurnRecord> for MessageResponse {
    fn from(record: TurnRecord) -> Self {
        Self {
            id: record.id.to_string(),
            session_id: record.session_id.to_string(),
            contact_id: record.contact_id.map(|c| c.to_string()),
            message: record.message,
            response: record.response,
            is_from_user: record.is_from_user,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

//! Lead domain - what gets forwarded to the CRM once a contact is complete.

mod phone_format;

pub use phone_format::format_international;

use serde::Serialize;

use crate::domain::foundation::{SessionId, ValidationError};

/// A completed contact ready for the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub name: String,
    /// International format, e.g. `+79371234378`.
    pub phone: String,
    pub comments: String,
}

impl Lead {
    /// Builds a lead, formatting the phone and composing the comment.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` when name or phone is blank.
    pub fn new(
        name: &str,
        phone: &str,
        summary: &str,
        session_id: Option<&SessionId>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if phone.is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }

        Ok(Self {
            name: name.to_string(),
            phone: format_international(phone),
            comments: compose_comments(summary, session_id),
        })
    }
}

fn compose_comments(summary: &str, session_id: Option<&SessionId>) -> String {
    let mut parts = Vec::new();
    let summary = summary.trim();
    if !summary.is_empty() {
        parts.push(summary.to_string());
    }
    if let Some(session_id) = session_id {
        parts.push(format!("Chat session: {}", session_id));
    }
    parts.join("\n\n")
}

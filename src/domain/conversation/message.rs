//! Persisted conversation turns.
//!
//! One record pairs the visitor's text with the generated reply so history
//! reconstruction keeps the pairing.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, MessageId, SessionId, Timestamp};

/// A persisted turn.
///
/// # Invariants
///
/// - records of one session are ordered by `created_at`, ties broken by
///   storage sequence
/// - only `contact_id` may change after creation (retroactive linkage)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub id: MessageId,
    pub session_id: SessionId,
    pub contact_id: Option<ContactId>,
    /// The visitor's raw text.
    pub message: String,
    /// The generated reply, absent only for records written outside a turn.
    pub response: Option<String>,
    pub is_from_user: bool,
    pub created_at: Timestamp,
}

impl TurnRecord {
    /// Creates the record for a completed turn.
    pub fn new_turn(
        session_id: SessionId,
        contact_id: Option<ContactId>,
        user_text: impl Into<String>,
        reply_text: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            contact_id,
            message: user_text.into(),
            response: Some(reply_text.into()),
            is_from_user: true,
            created_at: Timestamp::now(),
        }
    }

    /// Returns the reply text, or an empty string.
    pub fn reply(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}

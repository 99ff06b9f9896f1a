//! Message repository port - append-only turn history per session.

use async_trait::async_trait;

use crate::domain::conversation::TurnRecord;
use crate::domain::foundation::{ContactId, DomainError, SessionId};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a turn record.
    async fn append(&self, record: &TurnRecord) -> Result<(), DomainError>;

    /// All turns of a session in conversation order (creation time, then
    /// insertion sequence).
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<TurnRecord>, DomainError>;

    /// Stamp `contact_id` on every turn of the session that has none yet.
    ///
    /// Returns the number of records updated.
    async fn link_session(
        &self,
        session_id: &SessionId,
        contact_id: &ContactId,
    ) -> Result<u64, DomainError>;

    /// All turns linked to a contact in conversation order.
    async fn list_by_contact(&self, contact_id: &ContactId) -> Result<Vec<TurnRecord>, DomainError>;

    /// Most recent turns across sessions, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<TurnRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MessageRepository) {}
    }
}

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::conversation::TurnRecord;
use crate::domain::foundation::{ContactId, DomainError, SessionId};
use crate::ports::MessageRepository;

/// Records are kept in insertion order, which stands in for the `seq` column.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    records: Mutex<Vec<TurnRecord>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<TurnRecord> {
        self.records.lock().await.clone()
    }
}

fn in_conversation_order(mut records: Vec<TurnRecord>) -> Vec<TurnRecord> {
    // Stable sort keeps insertion order for equal timestamps.
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    records
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, record: &TurnRecord) -> Result<(), DomainError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<TurnRecord>, DomainError> {
        let records = self.records.lock().await;
        Ok(in_conversation_order(
            records
                .iter()
                .filter(|r| &r.session_id == session_id)
                .cloned()
                .collect(),
        ))
    }

    async fn link_session(
        &self,
        session_id: &SessionId,
        contact_id: &ContactId,
    ) -> Result<u64, DomainError> {
        let mut records = self.records.lock().await;
        let mut updated = 0;
        for record in records
            .iter_mut()
            .filter(|r| &r.session_id == session_id && r.contact_id.is_none())
        {
            record.contact_id = Some(*contact_id);
            updated += 1;
        }
        Ok(updated)
    }

    async fn list_by_contact(&self, contact_id: &ContactId) -> Result<Vec<TurnRecord>, DomainError> {
        let records = self.records.lock().await;
        Ok(in_conversation_order(
            records
                .iter()
                .filter(|r| r.contact_id.as_ref() == Some(contact_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<TurnRecord>, DomainError> {
        let mut records = in_conversation_order(self.records.lock().await.clone());
        records.reverse();
        records.truncate(limit as usize);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn link_session_only_touches_unlinked_records_of_session() {
        let repo = InMemoryMessageRepository::new();
        let session = SessionId::generate();
        let other = SessionId::generate();
        let earlier = ContactId::new();
        let contact = ContactId::new();

        repo.append(&TurnRecord::new_turn(session.clone(), None, "a", "ra")).await.unwrap();
        repo.append(&TurnRecord::new_turn(session.clone(), Some(earlier), "b", "rb")).await.unwrap();
        repo.append(&TurnRecord::new_turn(other.clone(), None, "c", "rc")).await.unwrap();

        let updated = repo.link_session(&session, &contact).await.unwrap();

        assert_eq!(updated, 1);
        let records = repo.list_by_session(&session).await.unwrap();
        assert_eq!(records[0].contact_id, Some(contact));
        assert_eq!(records[1].contact_id, Some(earlier));
        assert!(repo.list_by_session(&other).await.unwrap()[0].contact_id.is_none());
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let repo = InMemoryMessageRepository::new();
        let session = SessionId::generate();
        for text in ["one", "two", "three"] {
            repo.append(&TurnRecord::new_turn(session.clone(), None, text, "ok")).await.unwrap();
        }

        let recent = repo.list_recent(2).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(texts, vec!["three", "two"]);
    }
}

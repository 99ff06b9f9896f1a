//! ConversationState - contact, session and history reconciliation.
//!
//! Owns the rules that tie a session's turns to a contact: adopting a
//! previously linked contact, merging candidate fields without overwriting
//! known values, and stamping the contact onto earlier turns.
//!
//! Writes for one session are serialized through [`SessionGuard`]: a turn
//! re-reads the session under the guard before it merges, links and appends,
//! so overlapping turns of the same visitor converge on one contact.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::contact::{Contact, FilledFields, MergeOutcome};
use crate::domain::conversation::TurnRecord;
use crate::domain::extraction::CandidateFields;
use crate::domain::foundation::{ContactId, DomainError, ErrorCode, SessionId};
use crate::ports::{ContactRepository, MessageRepository};

/// What is known about a session before the current turn.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub contact: Option<Contact>,
    /// Persisted turns in conversation order; never includes the turn in flight.
    pub prior: Vec<TurnRecord>,
}

impl SessionSnapshot {
    /// Visitor texts of the prior turns, oldest first.
    pub fn prior_user_texts(&self) -> impl Iterator<Item = &str> {
        self.prior
            .iter()
            .filter(|r| r.is_from_user)
            .map(|r| r.message.as_str())
    }

    /// True if some prior turn already carries a contact id.
    pub fn is_linked(&self) -> bool {
        self.prior.iter().any(|r| r.contact_id.is_some())
    }
}

/// Per-session write locks, created on demand and dropped when unused.
#[derive(Debug, Default)]
struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    fn entry(&self, session_id: &SessionId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(session_id.clone()).or_default().clone()
    }

    fn release(&self, session_id: &SessionId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Map entry plus the releasing guard's clone: nobody else is waiting.
        if locks.get(session_id).is_some_and(|lock| Arc::strong_count(lock) <= 2) {
            locks.remove(session_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Exclusive write access to one session, held from reconciliation to persistence.
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: SessionId,
    _held: OwnedMutexGuard<()>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.session_id);
    }
}

pub struct ConversationState {
    contacts: Arc<dyn ContactRepository>,
    messages: Arc<dyn MessageRepository>,
    sessions: SessionLocks,
}

impl ConversationState {
    pub fn new(contacts: Arc<dyn ContactRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self {
            contacts,
            messages,
            sessions: SessionLocks::default(),
        }
    }

    /// Waits for exclusive write access to `session_id`.
    ///
    /// Within one process this keeps two turns of the same session from both
    /// deciding that no contact exists yet.
    pub async fn lock_session(&self, session_id: &SessionId) -> SessionGuard<'_> {
        let held = self.sessions.entry(session_id).lock_owned().await;
        SessionGuard {
            locks: &self.sessions,
            session_id: session_id.clone(),
            _held: held,
        }
    }

    /// Loads prior turns and adopts the first contact any of them carries.
    pub async fn resolve_session(&self, session_id: &SessionId) -> Result<SessionSnapshot, DomainError> {
        let prior = self.messages.list_by_session(session_id).await?;

        let contact = match prior.iter().find_map(|r| r.contact_id) {
            Some(contact_id) => {
                let found = self.contacts.find_by_id(&contact_id).await?;
                if found.is_none() {
                    tracing::warn!(
                        session_id = %session_id,
                        contact_id = %contact_id,
                        "session references a missing contact"
                    );
                }
                found
            }
            None => None,
        };

        Ok(SessionSnapshot {
            session_id: session_id.clone(),
            contact,
            prior,
        })
    }

    /// Merges candidate fields into the existing contact, or finds/creates one.
    ///
    /// Returns `None` only when there is no existing contact and nothing to
    /// create one from.
    pub async fn merge_contact(
        &self,
        existing: Option<&Contact>,
        candidates: &CandidateFields,
    ) -> Result<Option<MergeOutcome>, DomainError> {
        let candidates = candidates.clone().normalized();

        match existing {
            Some(contact) if candidates.is_empty() || contact.is_complete() => {
                Ok(Some(contact.merge(&CandidateFields::default())))
            }
            Some(contact) => self.merge_existing(contact, &candidates).await.map(Some),
            None if candidates.is_empty() => Ok(None),
            None if candidates.phone.is_some() => {
                self.contacts.upsert_by_phone(&candidates).await.map(Some)
            }
            None => {
                let contact = Contact::from_candidates(&candidates);
                self.contacts.create(&contact).await?;
                Ok(Some(MergeOutcome {
                    newly_filled: FilledFields {
                        name: contact.has_name(),
                        phone: false,
                    },
                    contact,
                    had_both_before: false,
                }))
            }
        }
    }

    async fn merge_existing(
        &self,
        contact: &Contact,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError> {
        match self.contacts.merge_into(&contact.id, candidates).await {
            Err(err) if err.code == ErrorCode::Conflict => {
                // The phone identifies someone else; keep the name, drop the phone.
                tracing::warn!(
                    contact_id = %contact.id,
                    "candidate phone belongs to another contact, ignoring it"
                );
                let without_phone = CandidateFields::new(candidates.name.clone(), None);
                self.contacts.merge_into(&contact.id, &without_phone).await
            }
            other => other,
        }
    }

    /// Stamps the contact onto every turn of the session that has none yet.
    pub async fn link_session_to_contact(
        &self,
        session_id: &SessionId,
        contact_id: &ContactId,
    ) -> Result<u64, DomainError> {
        let linked = self.messages.link_session(session_id, contact_id).await?;
        if linked > 0 {
            tracing::debug!(session_id = %session_id, contact_id = %contact_id, linked, "linked session turns");
        }
        Ok(linked)
    }

    /// Appends the paired record of a completed turn.
    pub async fn append_turn(
        &self,
        session_id: &SessionId,
        contact_id: Option<ContactId>,
        user_text: &str,
        reply_text: &str,
    ) -> Result<TurnRecord, DomainError> {
        let record = TurnRecord::new_turn(session_id.clone(), contact_id, user_text, reply_text);
        self.messages.append(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryContactRepository, InMemoryMessageRepository};

    struct Fixture {
        state: ConversationState,
        contacts: Arc<InMemoryContactRepository>,
        messages: Arc<InMemoryMessageRepository>,
    }

    fn fixture() -> Fixture {
        let contacts = Arc::new(InMemoryContactRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        Fixture {
            state: ConversationState::new(contacts.clone(), messages.clone()),
            contacts,
            messages,
        }
    }

    fn fields(name: Option<&str>, phone: Option<&str>) -> CandidateFields {
        CandidateFields::new(name.map(String::from), phone.map(String::from))
    }

    #[tokio::test]
    async fn resolve_session_of_new_session_is_empty() {
        let f = fixture();
        let snapshot = f.state.resolve_session(&SessionId::generate()).await.unwrap();
        assert!(snapshot.contact.is_none());
        assert!(snapshot.prior.is_empty());
        assert!(!snapshot.is_linked());
    }

    #[tokio::test]
    async fn resolve_session_adopts_linked_contact() {
        let f = fixture();
        let session = SessionId::generate();
        let outcome = f
            .state
            .merge_contact(None, &fields(Some("Иван"), None))
            .await
            .unwrap()
            .unwrap();
        f.state.append_turn(&session, None, "привет", "здравствуйте").await.unwrap();
        f.state
            .append_turn(&session, Some(outcome.contact.id), "Меня зовут Иван", "Приятно!")
            .await
            .unwrap();

        let snapshot = f.state.resolve_session(&session).await.unwrap();
        assert_eq!(snapshot.contact.as_ref().unwrap().id, outcome.contact.id);
        assert_eq!(
            snapshot.prior_user_texts().collect::<Vec<_>>(),
            vec!["привет", "Меня зовут Иван"]
        );
    }

    #[tokio::test]
    async fn merge_without_contact_or_fields_creates_nothing() {
        let f = fixture();
        let outcome = f.state.merge_contact(None, &fields(None, Some("  "))).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(f.contacts.count().await, 0);
    }

    #[tokio::test]
    async fn merge_by_phone_deduplicates_across_sessions() {
        let f = fixture();
        let first = f
            .state
            .merge_contact(None, &fields(Some("Иван"), Some("+79371234378")))
            .await
            .unwrap()
            .unwrap();
        let second = f
            .state
            .merge_contact(None, &fields(Some("Пётр"), Some("+79371234378")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.contact.id, second.contact.id);
        assert_eq!(second.contact.name.as_deref(), Some("Иван"));
        assert!(second.had_both_before);
        assert_eq!(f.contacts.count().await, 1);
    }

    #[tokio::test]
    async fn merge_into_existing_fills_missing_phone() {
        let f = fixture();
        let created = f
            .state
            .merge_contact(None, &fields(Some("Иван"), None))
            .await
            .unwrap()
            .unwrap();
        assert!(created.newly_filled.name);

        let merged = f
            .state
            .merge_contact(Some(&created.contact), &fields(Some("Пётр"), Some("+79371234378")))
            .await
            .unwrap()
            .unwrap();

        assert!(merged.completes_contact());
        assert!(merged.newly_filled.phone);
        assert!(!merged.newly_filled.name);
        assert_eq!(merged.contact.name.as_deref(), Some("Иван"));
    }

    #[tokio::test]
    async fn conflicting_phone_is_dropped_but_name_kept() {
        let f = fixture();
        f.state
            .merge_contact(None, &fields(Some("Пётр"), Some("+79990001122")))
            .await
            .unwrap();
        let anonymous = Contact::from_candidates(&fields(None, None));
        f.contacts.create(&anonymous).await.unwrap();

        let merged = f
            .state
            .merge_contact(Some(&anonymous), &fields(Some("Иван"), Some("+79990001122")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.contact.name.as_deref(), Some("Иван"));
        assert!(!merged.contact.has_phone());
        assert!(!merged.completes_contact());
    }

    #[tokio::test]
    async fn complete_contact_is_left_alone() {
        let f = fixture();
        let complete = f
            .state
            .merge_contact(None, &fields(Some("Иван"), Some("+79371234378")))
            .await
            .unwrap()
            .unwrap()
            .contact;

        let again = f
            .state
            .merge_contact(Some(&complete), &fields(Some("Пётр"), Some("+79990001122")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(again.contact, complete);
        assert!(again.had_both_before);
        assert!(!again.completes_contact());
    }

    #[tokio::test]
    async fn session_lock_serializes_same_session_and_is_released() {
        let f = Arc::new(fixture());
        let session = SessionId::parse("tab").unwrap();

        let guard = f.state.lock_session(&session).await;
        let waiter = {
            let f = f.clone();
            let session = session.clone();
            tokio::spawn(async move {
                let _guard = f.state.lock_session(&session).await;
                f.state.resolve_session(&session).await.unwrap().prior.len()
            })
        };
        f.state.append_turn(&session, None, "первый", "ok").await.unwrap();
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        drop(guard);

        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(f.state.sessions.len(), 0);
    }

    #[tokio::test]
    async fn other_sessions_are_not_blocked() {
        let f = fixture();
        let _held = f.state.lock_session(&SessionId::parse("a").unwrap()).await;
        let other = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            f.state.lock_session(&SessionId::parse("b").unwrap()),
        )
        .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn linkage_is_retroactive() {
        let f = fixture();
        let session = SessionId::generate();
        for text in ["m1", "m2", "m3"] {
            f.state.append_turn(&session, None, text, "ok").await.unwrap();
        }
        let contact = ContactId::new();

        let linked = f.state.link_session_to_contact(&session, &contact).await.unwrap();
        f.state.append_turn(&session, Some(contact), "m4", "ok").await.unwrap();

        assert_eq!(linked, 3);
        let records = f.messages.all().await;
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.contact_id == Some(contact)));
    }
}

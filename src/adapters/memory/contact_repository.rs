use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::contact::{Contact, MergeOutcome};
use crate::domain::extraction::CandidateFields;
use crate::domain::foundation::{ContactId, DomainError, ErrorCode};
use crate::ports::ContactRepository;

#[derive(Default)]
pub struct InMemoryContactRepository {
    contacts: Mutex<Vec<Contact>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.contacts.lock().await.len()
    }
}

fn phone_taken(contacts: &[Contact], phone: &str, except: &ContactId) -> bool {
    contacts
        .iter()
        .any(|c| &c.id != except && c.phone.as_deref() == Some(phone))
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError> {
        Ok(self.contacts.lock().await.iter().find(|c| &c.id == id).cloned())
    }

    async fn create(&self, contact: &Contact) -> Result<(), DomainError> {
        let mut contacts = self.contacts.lock().await;
        if let Some(phone) = contact.phone.as_deref() {
            if phone_taken(&contacts, phone, &contact.id) {
                return Err(DomainError::new(
                    ErrorCode::Conflict,
                    format!("Phone already belongs to another contact: {}", phone),
                ));
            }
        }
        contacts.push(contact.clone());
        Ok(())
    }

    async fn upsert_by_phone(
        &self,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError> {
        let phone = candidates.phone.clone().ok_or_else(|| {
            DomainError::new(ErrorCode::ValidationFailed, "upsert_by_phone requires a phone")
        })?;

        let mut contacts = self.contacts.lock().await;
        match contacts
            .iter_mut()
            .find(|c| c.phone.as_deref() == Some(phone.as_str()))
        {
            Some(existing) => {
                let outcome = existing.merge(candidates);
                *existing = outcome.contact.clone();
                Ok(outcome)
            }
            None => {
                let outcome = Contact::from_candidates(&CandidateFields::new(None, None))
                    .merge(candidates);
                contacts.push(outcome.contact.clone());
                Ok(outcome)
            }
        }
    }

    async fn merge_into(
        &self,
        id: &ContactId,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError> {
        let mut contacts = self.contacts.lock().await;
        let index = contacts.iter().position(|c| &c.id == id).ok_or_else(|| {
            DomainError::new(ErrorCode::ContactNotFound, format!("Contact not found: {}", id))
        })?;

        let outcome = contacts[index].merge(candidates);
        if outcome.newly_filled.phone {
            if let Some(phone) = outcome.contact.phone.as_deref() {
                if phone_taken(&contacts, phone, id) {
                    return Err(DomainError::new(
                        ErrorCode::Conflict,
                        format!("Phone already belongs to another contact: {}", phone),
                    ));
                }
            }
        }

        contacts[index] = outcome.contact.clone();
        Ok(outcome)
    }

    async fn list_newest_first(&self) -> Result<Vec<Contact>, DomainError> {
        let mut contacts = self.contacts.lock().await.clone();
        // Insertion order breaks created_at ties, newest insert first.
        contacts.reverse();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fields(name: Option<&str>, phone: Option<&str>) -> CandidateFields {
        CandidateFields::new(name.map(String::from), phone.map(String::from))
    }

    #[tokio::test]
    async fn upsert_creates_then_merges() {
        let repo = InMemoryContactRepository::new();

        let first = repo
            .upsert_by_phone(&fields(None, Some("+79371234378")))
            .await
            .unwrap();
        assert!(!first.had_both_before);
        assert!(first.newly_filled.phone);

        let second = repo
            .upsert_by_phone(&fields(Some("Иван"), Some("+79371234378")))
            .await
            .unwrap();
        assert_eq!(second.contact.id, first.contact.id);
        assert!(second.completes_contact());
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn upsert_without_phone_is_rejected() {
        let repo = InMemoryContactRepository::new();
        let err = repo.upsert_by_phone(&fields(Some("Иван"), None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn merge_into_refuses_phone_of_other_contact() {
        let repo = InMemoryContactRepository::new();
        repo.upsert_by_phone(&fields(Some("Пётр"), Some("+79990001122")))
            .await
            .unwrap();
        let ivan = Contact::from_candidates(&fields(Some("Иван"), None));
        repo.create(&ivan).await.unwrap();

        let err = repo
            .merge_into(&ivan.id, &fields(None, Some("+79990001122")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(!repo.find_by_id(&ivan.id).await.unwrap().unwrap().has_phone());
    }

    #[tokio::test]
    async fn merge_into_unknown_contact_is_not_found() {
        let repo = InMemoryContactRepository::new();
        let err = repo
            .merge_into(&ContactId::new(), &fields(Some("Иван"), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ContactNotFound);
    }

    #[tokio::test]
    async fn concurrent_upserts_of_one_phone_yield_one_contact() {
        let repo = Arc::new(InMemoryContactRepository::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let name = if i % 2 == 0 { Some("Иван") } else { None };
                repo.upsert_by_phone(&fields(name, Some("+79371234378")))
                    .await
                    .unwrap()
            }));
        }
        let mut completions = 0;
        for handle in handles {
            if handle.await.unwrap().completes_contact() {
                completions += 1;
            }
        }

        assert_eq!(repo.count().await, 1);
        assert_eq!(completions, 1);
    }
}

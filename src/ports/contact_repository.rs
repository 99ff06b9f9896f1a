//! Contact repository port.
//!
//! Contacts are deduplicated by phone. Implementations must make the
//! phone-keyed lookup-then-create-or-merge atomic (unique constraint plus row
//! lock, or an equivalent mutual-exclusion scope) so overlapping turns for
//! the same visitor yield exactly one contact.

use async_trait::async_trait;

use crate::domain::contact::{Contact, MergeOutcome};
use crate::domain::extraction::CandidateFields;
use crate::domain::foundation::{ContactId, DomainError};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Find a contact by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError>;

    /// Insert a brand-new contact.
    ///
    /// # Errors
    ///
    /// - `Conflict` if another contact already owns the phone
    /// - `DatabaseError` on persistence failure
    async fn create(&self, contact: &Contact) -> Result<(), DomainError>;

    /// Atomically find-or-create the contact owning `candidates.phone` and
    /// merge the remaining candidate fields into it.
    ///
    /// `had_both_before` in the outcome describes the stored row as it was
    /// before this call; a freshly created row counts as empty.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `candidates.phone` is absent
    /// - `DatabaseError` on persistence failure
    async fn upsert_by_phone(&self, candidates: &CandidateFields)
        -> Result<MergeOutcome, DomainError>;

    /// Atomically re-read the contact and fill its empty fields.
    ///
    /// # Errors
    ///
    /// - `ContactNotFound` if the contact does not exist
    /// - `Conflict` if the phone being filled belongs to another contact
    /// - `DatabaseError` on persistence failure
    async fn merge_into(
        &self,
        id: &ContactId,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError>;

    /// All contacts, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Contact>, DomainError>;
}

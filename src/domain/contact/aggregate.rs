use serde::{Deserialize, Serialize};

use crate::domain::extraction::CandidateFields;
use crate::domain::foundation::{ContactId, Timestamp};

use super::ContactStatus;

/// A single real-world person the assistant is trying to identify.
///
/// `name` and `phone` follow fill-only-if-empty semantics: once set they are
/// never replaced by [`Contact::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: Timestamp,
}

/// Which fields a merge filled for the first time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilledFields {
    pub name: bool,
    pub phone: bool,
}

impl FilledFields {
    pub fn any(&self) -> bool {
        self.name || self.phone
    }
}

/// Result of merging candidate fields into a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub contact: Contact,
    pub newly_filled: FilledFields,
    /// Whether the contact had both name and phone strictly before the merge.
    pub had_both_before: bool,
}

impl MergeOutcome {
    /// True exactly when this merge completed the contact.
    pub fn completes_contact(&self) -> bool {
        !self.had_both_before && self.contact.is_complete()
    }
}

impl Contact {
    /// Creates a fresh contact from candidate fields.
    pub fn from_candidates(candidates: &CandidateFields) -> Self {
        let candidates = candidates.clone().normalized();
        Self {
            id: ContactId::new(),
            name: candidates.name,
            phone: candidates.phone,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitutes a contact from storage.
    pub fn reconstitute(
        id: ContactId,
        name: Option<String>,
        phone: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            phone,
            created_at,
        }
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.has_name() && self.has_phone()
    }

    pub fn status(&self) -> ContactStatus {
        ContactStatus::of(self.has_name(), self.has_phone())
    }

    /// Fills empty fields from `candidates`; populated fields are untouched.
    pub fn merge(&self, candidates: &CandidateFields) -> MergeOutcome {
        let candidates = candidates.clone().normalized();
        let had_both_before = self.is_complete();
        let mut contact = self.clone();
        let mut newly_filled = FilledFields::default();

        if !contact.has_name() {
            if let Some(name) = candidates.name {
                contact.name = Some(name);
                newly_filled.name = true;
            }
        }
        if !contact.has_phone() {
            if let Some(phone) = candidates.phone {
                contact.phone = Some(phone);
                newly_filled.phone = true;
            }
        }

        MergeOutcome {
            contact,
            newly_filled,
            had_both_before,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidates(name: Option<&str>, phone: Option<&str>) -> CandidateFields {
        CandidateFields::new(name.map(String::from), phone.map(String::from))
    }

    #[test]
    fn from_candidates_copies_present_fields() {
        let contact = Contact::from_candidates(&candidates(Some("Иван"), None));
        assert_eq!(contact.name.as_deref(), Some("Иван"));
        assert!(contact.phone.is_none());
        assert_eq!(contact.status(), ContactStatus::NameOnly);
    }

    #[test]
    fn merge_fills_empty_fields_only() {
        let contact = Contact::from_candidates(&candidates(Some("Иван"), None));
        let outcome = contact.merge(&candidates(Some("Пётр"), Some("+79371234378")));

        assert_eq!(outcome.contact.name.as_deref(), Some("Иван"));
        assert_eq!(outcome.contact.phone.as_deref(), Some("+79371234378"));
        assert_eq!(outcome.newly_filled, FilledFields { name: false, phone: true });
        assert!(!outcome.had_both_before);
        assert!(outcome.completes_contact());
    }

    #[test]
    fn merge_on_complete_contact_reports_had_both() {
        let contact = Contact::from_candidates(&candidates(Some("Иван"), Some("+79371234378")));
        let outcome = contact.merge(&candidates(Some("Пётр"), Some("+79031112233")));

        assert!(outcome.had_both_before);
        assert!(!outcome.newly_filled.any());
        assert!(!outcome.completes_contact());
        assert_eq!(outcome.contact, contact);
    }

    #[test]
    fn blank_stored_value_counts_as_empty() {
        let contact = Contact::reconstitute(
            ContactId::new(),
            Some("  ".to_string()),
            None,
            Timestamp::now(),
        );
        let outcome = contact.merge(&candidates(Some("Анна"), None));
        assert_eq!(outcome.contact.name.as_deref(), Some("Анна"));
        assert!(outcome.newly_filled.name);
    }

    fn arb_field() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-Za-zА-Яа-я0-9+]{1,12}")
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(
            start_name in arb_field(),
            start_phone in arb_field(),
            name in arb_field(),
            phone in arb_field(),
        ) {
            let contact = Contact::reconstitute(ContactId::new(), start_name, start_phone, Timestamp::now());
            let fields = CandidateFields::new(name, phone);

            let once = contact.merge(&fields).contact;
            let twice = once.merge(&fields).contact;
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn complete_contact_never_changes(
            name in "[A-Za-z]{2,10}",
            phone in "[0-9]{10}",
            other_name in arb_field(),
            other_phone in arb_field(),
        ) {
            let contact = Contact::reconstitute(ContactId::new(), Some(name.clone()), Some(phone.clone()), Timestamp::now());
            let outcome = contact.merge(&CandidateFields::new(other_name, other_phone));
            prop_assert_eq!(outcome.contact.name, Some(name));
            prop_assert_eq!(outcome.contact.phone, Some(phone));
            prop_assert!(outcome.had_both_before);
        }
    }
}

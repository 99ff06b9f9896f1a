use serde::Serialize;
use std::fmt;

/// How much of a contact the assistant already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Unknown,
    NameOnly,
    PhoneOnly,
    Complete,
}

impl ContactStatus {
    pub fn of(has_name: bool, has_phone: bool) -> Self {
        match (has_name, has_phone) {
            (false, false) => ContactStatus::Unknown,
            (true, false) => ContactStatus::NameOnly,
            (false, true) => ContactStatus::PhoneOnly,
            (true, true) => ContactStatus::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ContactStatus::Complete)
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContactStatus::Unknown => "none",
            ContactStatus::NameOnly => "name-only",
            ContactStatus::PhoneOnly => "phone-only",
            ContactStatus::Complete => "both",
        };
        f.write_str(s)
    }
}

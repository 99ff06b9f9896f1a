use serde::{Deserialize, Serialize};

/// Candidate contact fields produced by one extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl CandidateFields {
    pub fn new(name: Option<String>, phone: Option<String>) -> Self {
        Self { name, phone }.normalized()
    }

    /// Drops blank values so that "present" always means non-empty.
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            phone: non_blank(self.phone),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.phone.is_some()
    }

    /// Fills only the fields that are still absent.
    pub fn fill_gaps_from(&mut self, other: &CandidateFields) {
        if self.name.is_none() {
            self.name = other.name.clone();
        }
        if self.phone.is_none() {
            self.phone = other.phone.clone();
        }
    }

    /// Returns `preferred` where it has a value, falling back to `self`.
    pub fn overridden_by(&self, preferred: &CandidateFields) -> CandidateFields {
        CandidateFields {
            name: preferred.name.clone().or_else(|| self.name.clone()),
            phone: preferred.phone.clone().or_else(|| self.phone.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

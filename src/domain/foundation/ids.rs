//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a contact (a deduplicated real-world person).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Creates a new random ContactId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ContactId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a persisted conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a knowledge-base document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque identifier of one visitor conversation thread.
///
/// Callers may supply their own value (reused across calls); when absent the
/// system generates one. Unlike the other ids this is not required to be a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Maximum accepted length for caller-supplied session ids.
    pub const MAX_LEN: usize = 128;

    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps a caller-supplied session id.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is blank or longer than [`Self::MAX_LEN`].
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(ValidationError::invalid_format(
                "session_id",
                format!("must be at most {} characters", Self::MAX_LEN),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Uses the supplied id when present and valid, otherwise generates one.
    pub fn resolve_or_generate(supplied: Option<&str>) -> Self {
        supplied
            .and_then(|s| Self::parse(s).ok())
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_id_round_trips_through_display() {
        let id = ContactId::new();
        let parsed: ContactId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn contact_ids_are_unique() {
        assert_ne!(ContactId::new(), ContactId::new());
    }

    #[test]
    fn session_id_keeps_caller_value() {
        let id = SessionId::parse("  widget-42 ").unwrap();
        assert_eq!(id.as_str(), "widget-42");
    }

    #[test]
    fn session_id_rejects_blank() {
        assert!(SessionId::parse("   ").is_err());
    }

    #[test]
    fn session_id_rejects_overlong_value() {
        let long = "x".repeat(SessionId::MAX_LEN + 1);
        assert!(SessionId::parse(long).is_err());
    }

    #[test]
    fn resolve_or_generate_falls_back_to_fresh_id() {
        let generated = SessionId::resolve_or_generate(None);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());

        let blank = SessionId::resolve_or_generate(Some(""));
        assert!(!blank.as_str().is_empty());

        let kept = SessionId::resolve_or_generate(Some("abc"));
        assert_eq!(kept.as_str(), "abc");
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, Timestamp, ValidationError};

/// A document registered in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: DocumentId,
    pub name: String,
    /// Source format label, e.g. `txt`.
    pub file_type: String,
    /// Size of the indexed text in bytes.
    pub file_size: i64,
    pub chunk_count: i32,
    pub created_at: Timestamp,
}

impl KnowledgeDocument {
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn new(name: &str, file_type: &str, text: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let file_type = match file_type.trim() {
            "" => "txt".to_string(),
            other => other.to_lowercase(),
        };
        Ok(Self {
            id: DocumentId::new(),
            name: name.to_string(),
            file_type,
            file_size: i64::try_from(text.len()).unwrap_or(i64::MAX),
            chunk_count: 0,
            created_at: Timestamp::now(),
        })
    }
}

//! Query normalization for entity lookups.

use once_cell::sync::Lazy;
use regex::Regex;

// "who is X", "кто такая X", "tell me about X", "расскажи про X".
static ENTITY_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:кто\s+(?:такая|такой|такие|такое)|who\s+is|who's|tell\s+me\s+about|расскажи(?:те)?\s+(?:мне\s+)?(?:о|об|про))\s+(.+?)[\s?!.,]*$",
    )
    .expect("entity question pattern is valid")
});

// Two capitalized words in a row, e.g. a first and last name.
static FULL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\p{Lu}\p{Ll}+[ \t]+\p{Lu}\p{Ll}+)\b").expect("full name pattern is valid")
});

/// A search query reduced to what should be embedded plus the entity
/// name (if any) used for lexical boosting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub text: String,
    pub entity: Option<String>,
}

impl NormalizedQuery {
    /// Reduces "who is X"-style questions to X. Other queries are embedded
    /// as-is, but a capitalized first/last name pair still feeds the boost.
    pub fn parse(query: &str) -> Self {
        let trimmed = query.trim();

        if let Some(entity) = ENTITY_QUESTION
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
        {
            return Self {
                text: entity.to_string(),
                entity: Some(entity.to_string()),
            };
        }

        let entity = FULL_NAME
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        Self {
            text: trimmed.to_string(),
            entity,
        }
    }
}

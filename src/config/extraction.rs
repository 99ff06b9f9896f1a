//! Name-extraction vocabulary overrides

use serde::Deserialize;

use crate::domain::extraction::ExclusionVocabulary;

/// Comma-separated overrides for the built-in word lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    /// Replaces the excluded-word list
    pub excluded_words: Option<String>,
    /// Replaces the preposition list
    pub prepositions: Option<String>,
    /// Added on top of whichever excluded list is in effect
    pub extra_excluded_words: Option<String>,
}

impl ExtractionConfig {
    pub fn vocabulary(&self) -> ExclusionVocabulary {
        let mut vocabulary = ExclusionVocabulary::default();
        if let Some(words) = split_list(&self.excluded_words) {
            vocabulary = vocabulary.replace_excluded(words);
        }
        if let Some(words) = split_list(&self.prepositions) {
            vocabulary = vocabulary.replace_prepositions(words);
        }
        if let Some(words) = split_list(&self.extra_excluded_words) {
            vocabulary = vocabulary.with_excluded(words);
        }
        vocabulary
    }
}

fn split_list(value: &Option<String>) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .as_deref()?
        .split(',')
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}

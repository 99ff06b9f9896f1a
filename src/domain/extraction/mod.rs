//! Entity extraction - pulls a visitor's name and phone out of free text.
//!
//! Extraction is pure and never fails: an absent field in
//! [`CandidateFields`] is the "not found" signal.

mod candidate;
mod name;
mod phone;
mod vocabulary;

pub use candidate::CandidateFields;
pub use name::NameExtractor;
pub use phone::{extract_phone, normalize_phone};
pub use vocabulary::ExclusionVocabulary;

/// Regex-based extractor for contact fields.
///
/// Acts as the fallback/booster layer: fields reported by the generation
/// model take precedence over whatever this returns.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    names: NameExtractor,
}

impl EntityExtractor {
    /// Creates an extractor that uses the given exclusion vocabulary.
    pub fn new(vocabulary: ExclusionVocabulary) -> Self {
        Self {
            names: NameExtractor::new(vocabulary),
        }
    }

    /// Extracts candidate `{name, phone}` fields from `text`.
    pub fn extract(&self, text: &str) -> CandidateFields {
        CandidateFields {
            name: self.names.extract(text),
            phone: extract_phone(text),
        }
    }

    /// Extracts from the current message, then fills remaining gaps from the
    /// whole visitor transcript (prior user turns followed by the current one).
    pub fn extract_with_history<'a, I>(&self, current: &str, prior_user_turns: I) -> CandidateFields
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = self.extract(current);
        if fields.is_complete() {
            return fields;
        }

        let mut transcript: Vec<&str> = prior_user_turns.into_iter().collect();
        if transcript.is_empty() {
            return fields;
        }
        transcript.push(current);
        let from_history = self.extract(&transcript.join("\n"));
        fields.fill_gaps_from(&from_history);
        fields
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(ExclusionVocabulary::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_fields_from_one_message() {
        let extractor = EntityExtractor::default();
        let fields = extractor.extract("Меня зовут Иван, мой номер +7 (937) 123-43-78");
        assert_eq!(fields.name.as_deref(), Some("Иван"));
        assert_eq!(fields.phone.as_deref(), Some("+79371234378"));
    }

    #[test]
    fn empty_text_yields_nothing() {
        let fields = EntityExtractor::default().extract("");
        assert!(fields.is_empty());
    }

    #[test]
    fn history_fills_gaps_left_by_current_message() {
        let extractor = EntityExtractor::default();
        let fields = extractor.extract_with_history("89371234378", ["Меня зовут Иван"]);
        assert_eq!(fields.name.as_deref(), Some("Иван"));
        assert_eq!(fields.phone.as_deref(), Some("+79371234378"));
    }

    #[test]
    fn current_message_wins_over_history() {
        let extractor = EntityExtractor::default();
        let fields = extractor.extract_with_history(
            "Меня зовут Пётр",
            ["Меня зовут Иван", "Мой телефон 89371234378"],
        );
        assert_eq!(fields.name.as_deref(), Some("Пётр"));
        assert_eq!(fields.phone.as_deref(), Some("+79371234378"));
    }

    #[test]
    fn no_history_means_current_only() {
        let extractor = EntityExtractor::default();
        let fields = extractor.extract_with_history("Спасибо", std::iter::empty());
        assert!(fields.is_empty());
    }
}

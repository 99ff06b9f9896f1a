//! Name extraction: lead-in phrases first, bare capitalized words second.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ExclusionVocabulary;

/// A lead-in phrase such as "меня зовут X" or "I am X".
struct LeadIn {
    pattern: Regex,
    /// Whether a lowercase capture is accepted (and then capitalized).
    accepts_lowercase: bool,
}

// Priority order: "my name is", "I am", "this is", "call me".
static LEAD_INS: Lazy<Vec<LeadIn>> = Lazy::new(|| {
    let build = |pattern: &str, accepts_lowercase: bool| LeadIn {
        pattern: Regex::new(pattern).expect("lead-in pattern is valid"),
        accepts_lowercase,
    };
    vec![
        build(
            r"(?i:\b(?:меня\s+зовут|мо[её]\s+имя|my\s+name\s+is))[\s,:\-]+(\p{L}+)",
            true,
        ),
        build(r"(?i:\b(?:я|i\s+am|i'm))[\s,]+(\p{Lu}\p{Ll}+)", false),
        build(r"(?i:\b(?:это|this\s+is))[\s,]+(\p{Lu}\p{Ll}+)", false),
        build(r"(?i:\b(?:зовите\s+меня|call\s+me))[\s,:\-]+(\p{L}+)", true),
    ]
});

// Runs of consecutive capitalized words ("Karena Zhou", "Анна").
static CAPITALIZED_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}\p{Ll}+(?:[ \t]+\p{Lu}\p{Ll}+)*\b").expect("capitalized pattern is valid")
});

static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Lu}\p{Ll}+").expect("word pattern is valid"));

/// Extracts a visitor's first name from free text.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    vocabulary: ExclusionVocabulary,
}

impl NameExtractor {
    pub fn new(vocabulary: ExclusionVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Returns the first qualifying name, or `None`.
    pub fn extract(&self, text: &str) -> Option<String> {
        let text = text.trim_start();
        if text.is_empty() {
            return None;
        }
        self.from_lead_ins(text).or_else(|| self.from_capitalized(text))
    }

    fn from_lead_ins(&self, text: &str) -> Option<String> {
        LEAD_INS.iter().find_map(|lead_in| {
            lead_in
                .pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|word| lead_in.accepts_lowercase || starts_uppercase(word))
                .find(|word| self.is_plausible(word))
                .map(capitalize)
        })
    }

    /// Fallback rule. A run that starts at position 0 loses only its first
    /// word; a run that follows a preposition is rejected entirely.
    fn from_capitalized(&self, text: &str) -> Option<String> {
        for run in CAPITALIZED_RUN.find_iter(text) {
            if self.preceded_by_preposition(&text[..run.start()]) {
                continue;
            }
            let skip_first = run.start() == 0;
            let found = CAPITALIZED_WORD
                .find_iter(run.as_str())
                .skip(usize::from(skip_first))
                .map(|m| m.as_str())
                .find(|word| self.is_plausible(word));
            if let Some(word) = found {
                return Some(word.to_string());
            }
        }
        None
    }

    fn is_plausible(&self, word: &str) -> bool {
        word.chars().count() >= 2 && !self.vocabulary.is_excluded(word)
    }

    fn preceded_by_preposition(&self, before: &str) -> bool {
        let before = before.trim_end_matches([' ', '\t']);
        let previous: String = before
            .chars()
            .rev()
            .take_while(|c| c.is_alphabetic())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        !previous.is_empty() && self.vocabulary.is_preposition(&previous)
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

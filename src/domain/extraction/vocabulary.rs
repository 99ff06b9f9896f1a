//! Word lists that keep the bare-capitalized-word name rule honest.
//!
//! These are deployment data: the defaults cover Russian and English
//! greetings, pronouns, question words and the domain filler nouns that tend
//! to appear capitalized at sentence starts.

use std::collections::HashSet;

const DEFAULT_EXCLUDED: &[&str] = &[
    // greetings and politeness
    "привет", "здравствуйте", "здравствуй", "здрасте", "добрый", "доброе", "доброй", "день",
    "вечер", "утро", "спасибо", "благодарю", "пожалуйста", "извините", "простите", "пока",
    "свидания", "hello", "hi", "hey", "thanks", "thank", "please", "sorry", "good", "morning",
    "evening", "afternoon", "bye",
    // pronouns
    "я", "мы", "вы", "ты", "он", "она", "они", "оно", "меня", "мне", "мой", "моя", "моё", "мое",
    "мои", "вас", "вам", "ваш", "ваша", "нас", "нам", "наш", "это", "этот", "эта", "эти", "тот",
    "i", "we", "you", "he", "she", "they", "it", "my", "your", "our", "this", "that", "me",
    // question words
    "кто", "что", "где", "когда", "как", "какой", "какая", "какое", "какие", "сколько", "почему",
    "зачем", "откуда", "куда", "можно", "who", "what", "where", "when", "how", "why", "which",
    "can", "could", "would",
    // answers and filler
    "да", "нет", "ок", "окей", "хорошо", "ладно", "отлично", "понятно", "yes", "no", "ok", "okay",
    "хочу", "хотел", "хотела", "интересует", "подскажите", "скажите", "расскажите", "помогите",
    "tell", "want", "need", "help",
    // domain nouns
    "цена", "цены", "стоимость", "прайс", "урок", "уроки", "занятие", "занятия", "курс", "курсы",
    "запись", "записаться", "расписание", "телефон", "номер", "имя", "преподаватель", "школа",
    "price", "lesson", "lessons", "course", "schedule", "phone", "number", "name", "teacher",
];

const DEFAULT_PREPOSITIONS: &[&str] = &[
    "в", "во", "на", "для", "к", "ко", "о", "об", "обо", "про", "с", "со", "у", "от", "до", "по",
    "за", "из", "без", "при", "над", "под", "перед", "через", "такая", "такой", "такое",
    "for", "to", "about", "with", "from", "at", "in", "on", "of", "by", "into",
];

/// Excluded words and blocking prepositions, stored lowercase.
#[derive(Debug, Clone)]
pub struct ExclusionVocabulary {
    excluded: HashSet<String>,
    prepositions: HashSet<String>,
}

impl ExclusionVocabulary {
    /// Builds a vocabulary from explicit lists, replacing the defaults.
    pub fn from_lists<I, J, S, T>(excluded: I, prepositions: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            excluded: lowercase_set(excluded),
            prepositions: lowercase_set(prepositions),
        }
    }

    /// Adds extra excluded words on top of the current set.
    pub fn with_excluded<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded.extend(lowercase_set(words));
        self
    }

    /// Replaces the excluded-word list, keeping prepositions.
    pub fn replace_excluded<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded = lowercase_set(words);
        self
    }

    /// Replaces the preposition list, keeping excluded words.
    pub fn replace_prepositions<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.prepositions = lowercase_set(words);
        self
    }

    pub fn is_excluded(&self, word: &str) -> bool {
        self.excluded.contains(&word.to_lowercase())
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(&word.to_lowercase())
    }
}

impl Default for ExclusionVocabulary {
    fn default() -> Self {
        Self::from_lists(DEFAULT_EXCLUDED.iter().copied(), DEFAULT_PREPOSITIONS.iter().copied())
    }
}

fn lowercase_set<I, S>(words: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_is_case_insensitive() {
        let vocab = ExclusionVocabulary::default();
        assert!(vocab.is_excluded("Здравствуйте"));
        assert!(vocab.is_excluded("PRICE"));
        assert!(!vocab.is_excluded("Иван"));
    }

    #[test]
    fn custom_lists_replace_defaults() {
        let vocab = ExclusionVocabulary::from_lists(["Салют"], ["для"]);
        assert!(vocab.is_excluded("салют"));
        assert!(!vocab.is_excluded("привет"));
        assert!(vocab.is_preposition("Для"));
    }

    #[test]
    fn extra_words_extend_the_set() {
        let vocab = ExclusionVocabulary::default().with_excluded(["Гитара"]);
        assert!(vocab.is_excluded("гитара"));
        assert!(vocab.is_excluded("привет"));
    }
}

//! Phone number extraction for the domestic (+7) numbering plan.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// National significant number length.
const NATIONAL_LEN: usize = 10;

/// Country code used when formatting a national number.
const COUNTRY_CODE: &str = "7";

/// Minimum number of distinct digits for a candidate to count as a real number.
const MIN_DISTINCT_DIGITS: usize = 3;

// Optional country code or trunk prefix, then 3-3-2-2 digit groups with
// optional separators. Boundaries are checked after matching.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?[78][\s\-]*)?\(?\d{3}\)?[\s\-]*\d{3}[\s\-]*\d{2}[\s\-]*\d{2}")
        .expect("phone pattern is valid")
});

/// Finds the first valid phone number in `text` and returns it in
/// canonical `+7XXXXXXXXXX` form.
pub fn extract_phone(text: &str) -> Option<String> {
    let mut from = 0;
    while let Some(m) = PHONE_PATTERN.find_at(text, from) {
        if !touches_digit(text, m.start(), m.end()) {
            if let Some(phone) = normalize_phone(m.as_str()) {
                return Some(phone);
            }
        }
        // A rejected match may overlap the real number; resume one char in.
        from = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Normalizes a phone string to `+7XXXXXXXXXX`.
///
/// Accepts 10 national digits, or 11 digits led by the `7` country code or
/// the `8` trunk prefix. Separators are ignored. Returns `None` for anything
/// else, including repeated-digit noise such as `0000000000`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = match digits.len() {
        NATIONAL_LEN => digits.as_str(),
        11 if digits.starts_with('7') || digits.starts_with('8') => &digits[1..],
        _ => return None,
    };

    let distinct: HashSet<char> = national.chars().collect();
    if distinct.len() < MIN_DISTINCT_DIGITS {
        return None;
    }

    Some(format!("+{}{}", COUNTRY_CODE, national))
}

fn touches_digit(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}

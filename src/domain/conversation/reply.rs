//! Parsing of the generation model's structured reply.
//!
//! The model is asked for `{"reply": ..., "name": ..., "phone": ...}`,
//! optionally wrapped in a fenced code block. Anything else degrades to
//! "raw text is the reply, no fields".

use serde::Deserialize;
use thiserror::Error;

use crate::domain::extraction::{normalize_phone, CandidateFields};

/// Maximum accepted reply length in bytes.
pub const MAX_REPLY_LENGTH: usize = 100_000;

/// Values the model uses to say "not provided".
const NONE_SENTINELS: &[&str] = &["none", "null", "unknown", "n/a", "нет", "-"];

// Markers a model may echo back from a prompt-injection attempt.
const INJECTION_MARKERS: &[&str] = &[
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Why a raw model output could not be read as a structured reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplyParseError {
    #[error("no JSON object found")]
    NoJson,

    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("reply field is empty")]
    EmptyReply,
}

/// A reply plus the model's own contact-field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredReply {
    pub reply: String,
    pub fields: CandidateFields,
}

#[derive(Deserialize)]
struct RawReply {
    reply: String,
    #[serde(default)]
    name: Option<serde_json::Value>,
    #[serde(default)]
    phone: Option<serde_json::Value>,
}

impl StructuredReply {
    /// Parses the model output, never failing.
    pub fn parse_or_raw(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(error = %e, "model output is not structured, using raw text");
                Self {
                    reply: sanitize(raw),
                    fields: CandidateFields::default(),
                }
            }
        }
    }

    /// Strictly parses the model output.
    pub fn parse(raw: &str) -> Result<Self, ReplyParseError> {
        let json = locate_json(raw).ok_or(ReplyParseError::NoJson)?;
        let parsed: RawReply =
            serde_json::from_str(&json).map_err(|e| ReplyParseError::Json(e.to_string()))?;

        let reply = sanitize(&parsed.reply);
        if reply.is_empty() {
            return Err(ReplyParseError::EmptyReply);
        }

        let name = parsed.name.as_ref().and_then(field_text);
        let phone = parsed
            .phone
            .as_ref()
            .and_then(field_text)
            .and_then(|p| normalize_phone(&p));

        Ok(Self {
            reply,
            fields: CandidateFields::new(name, phone),
        })
    }
}

/// Reads a model-reported field, treating sentinels and non-strings as absent.
fn field_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let lowered = text.to_lowercase();
    if text.is_empty() || NONE_SENTINELS.contains(&lowered.as_str()) {
        return None;
    }
    Some(text)
}

/// Cleans a lead summary; a sentinel answer such as `none` becomes empty.
pub fn clean_summary(raw: &str) -> String {
    let summary = sanitize(raw);
    let bare = summary
        .trim_matches(|c: char| c == '.' || c == '"' || c.is_whitespace())
        .to_lowercase();
    if NONE_SENTINELS.contains(&bare.as_str()) {
        String::new()
    } else {
        summary
    }
}

/// Strips control characters and injection markers, trims, and bounds length.
pub fn sanitize(text: &str) -> String {
    let mut cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect();
    for marker in INJECTION_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let trimmed = cleaned.trim();
    if trimmed.len() <= MAX_REPLY_LENGTH {
        return trimmed.to_string();
    }
    let mut end = MAX_REPLY_LENGTH;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

fn locate_json(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(block) = from_code_block(trimmed) {
        return balanced_object(&block).or(Some(block));
    }
    balanced_object(trimmed)
}

fn from_code_block(s: &str) -> Option<String> {
    for fence in ["```json", "```"] {
        if let Some(start) = s.find(fence) {
            let body_start = start + fence.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim().to_string());
            }
        }
    }
    None
}

fn balanced_object(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(s[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let raw = r#"{"reply": "Приятно познакомиться, Иван!", "name": "Иван", "phone": null}"#;
        let parsed = StructuredReply::parse(raw).unwrap();
        assert_eq!(parsed.reply, "Приятно познакомиться, Иван!");
        assert_eq!(parsed.fields.name.as_deref(), Some("Иван"));
        assert_eq!(parsed.fields.phone, None);
    }

    #[test]
    fn parses_json_in_code_block_with_preamble() {
        let raw = "Вот ответ:\n```json\n{\"reply\": \"Спасибо!\", \"name\": \"none\", \"phone\": \"8 937 123-43-78\"}\n```";
        let parsed = StructuredReply::parse(raw).unwrap();
        assert_eq!(parsed.reply, "Спасибо!");
        assert_eq!(parsed.fields.name, None);
        assert_eq!(parsed.fields.phone.as_deref(), Some("+79371234378"));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scanner() {
        let raw = r#"{"reply": "Используйте {скобки} смело", "name": null}"#;
        let parsed = StructuredReply::parse(raw).unwrap();
        assert_eq!(parsed.reply, "Используйте {скобки} смело");
    }

    #[test]
    fn invalid_phone_from_model_is_dropped() {
        let raw = r#"{"reply": "ok", "phone": "12345"}"#;
        let parsed = StructuredReply::parse(raw).unwrap();
        assert_eq!(parsed.fields.phone, None);
    }

    #[test]
    fn sentinels_are_case_insensitive() {
        let raw = r#"{"reply": "ok", "name": "None", "phone": "NULL"}"#;
        let parsed = StructuredReply::parse(raw).unwrap();
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn plain_text_degrades_to_raw_reply() {
        let parsed = StructuredReply::parse_or_raw("Здравствуйте! Чем могу помочь?");
        assert_eq!(parsed.reply, "Здравствуйте! Чем могу помочь?");
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn json_without_reply_field_degrades_to_raw_reply() {
        let raw = r#"{"answer": "hi"}"#;
        assert!(matches!(StructuredReply::parse(raw), Err(ReplyParseError::Json(_))));
        let parsed = StructuredReply::parse_or_raw(raw);
        assert_eq!(parsed.reply, raw);
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert_eq!(
            StructuredReply::parse(r#"{"reply": "  "}"#),
            Err(ReplyParseError::EmptyReply)
        );
    }

    #[test]
    fn sanitize_strips_control_chars_and_markers() {
        assert_eq!(sanitize("Hello\x00 <|im_end|>world\x07"), "Hello world");
        assert_eq!(sanitize("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn summary_sentinels_become_empty() {
        assert_eq!(clean_summary("none"), "");
        assert_eq!(clean_summary(" None. "), "");
        assert_eq!(
            clean_summary("Спрашивал про цены на вокал."),
            "Спрашивал про цены на вокал."
        );
    }
}

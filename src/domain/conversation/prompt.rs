//! Prompt assembly for reply generation and lead summaries.

use serde::{Deserialize, Serialize};

use crate::domain::contact::{Contact, ContactStatus};
use crate::domain::knowledge::KnowledgeFragment;

use super::TurnRecord;

const POLICY_PREAMBLE: &str = "\
You are a friendly support assistant in a website chat. You have two goals: help the visitor, \
and collect their contact details (name and phone number).

Rules:
1. Knowledge base. When knowledge base fragments are provided below, answer only from them and \
keep their facts as written. Never invent facts that are not in the knowledge base. Never mix \
facts about different people or entities: if the visitor asks about one person, answer only \
about that person.
2. Contacts. While the name or the phone number is missing, politely ask for what is missing on \
every turn. Once both are known, never ask for them again.
3. Context. Remember the whole conversation, address the visitor by name when you know it, and \
reply in the visitor's language.

Respond with a single JSON object and nothing else:
{\"reply\": \"<your message to the visitor>\", \"name\": \"<the visitor's own name if they stated it, otherwise null>\", \"phone\": \"<the visitor's phone number if they stated it, otherwise null>\"}";

const SUMMARY_INSTRUCTION: &str = "\
Summarize the conversation below for a sales manager in two or three sentences, in the visitor's \
language: what the visitor asked about and what they want. If nothing substantive was discussed, \
answer with exactly: none";

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// A system prompt plus the ordered conversation to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub messages: Vec<PromptMessage>,
}

/// Builds generation prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            preamble: POLICY_PREAMBLE.to_string(),
        }
    }

    /// Replaces the policy preamble (the JSON output contract is part of it).
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Prompt for answering the current visitor message.
    pub fn turn_prompt(
        &self,
        contact: Option<&Contact>,
        fragments: &[KnowledgeFragment],
        history: &[TurnRecord],
        current: &str,
    ) -> GenerationPrompt {
        let mut system = self.preamble.clone();
        system.push_str("\n\n");
        system.push_str(&status_line(contact));

        if !fragments.is_empty() {
            system.push_str("\n\nKnowledge base fragments (use only these facts):\n");
            for (i, fragment) in fragments.iter().enumerate() {
                system.push_str(&format!("{}. {}\n", i + 1, fragment.text.trim()));
            }
        }

        let mut messages = history_messages(history);
        messages.push(PromptMessage::user(current));

        GenerationPrompt { system, messages }
    }

    /// Prompt for the lead summary, or `None` if there is no visitor text.
    pub fn summary_prompt(&self, transcript: &[(String, String)]) -> Option<GenerationPrompt> {
        if transcript.iter().all(|(user, _)| user.trim().is_empty()) {
            return None;
        }
        let body = transcript
            .iter()
            .map(|(user, reply)| format!("Visitor: {}\nAssistant: {}", user.trim(), reply.trim()))
            .collect::<Vec<_>>()
            .join("\n");

        Some(GenerationPrompt {
            system: SUMMARY_INSTRUCTION.to_string(),
            messages: vec![PromptMessage::user(body)],
        })
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn status_line(contact: Option<&Contact>) -> String {
    let status = contact.map(Contact::status).unwrap_or(ContactStatus::Unknown);
    let name = contact.and_then(|c| c.name.as_deref()).unwrap_or_default();
    match status {
        ContactStatus::Unknown => {
            "Contact status: nothing collected yet. Ask for the visitor's name and phone number."
                .to_string()
        }
        ContactStatus::NameOnly => format!(
            "Contact status: the visitor's name is {}. The phone number is missing, ask for it.",
            name
        ),
        ContactStatus::PhoneOnly => {
            "Contact status: the phone number is known. The name is missing, ask for it."
                .to_string()
        }
        ContactStatus::Complete => format!(
            "Contact status: name ({}) and phone number are both collected. Do not ask for them again.",
            name
        ),
    }
}

fn history_messages(history: &[TurnRecord]) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2);
    for turn in history {
        messages.push(PromptMessage::user(turn.message.clone()));
        if let Some(reply) = turn.response.as_deref().filter(|r| !r.is_empty()) {
            messages.push(PromptMessage::assistant(reply));
        }
    }
    messages
}

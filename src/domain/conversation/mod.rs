//! Conversation domain module.
//!
//! Turn phases, persisted turn records, prompt assembly and parsing of the
//! model's structured reply.

mod message;
mod phase;
mod prompt;
mod reply;

pub use message::TurnRecord;
pub use phase::TurnPhase;
pub use prompt::{GenerationPrompt, PromptBuilder, PromptMessage, PromptRole};
pub use reply::{clean_summary, sanitize, ReplyParseError, StructuredReply, MAX_REPLY_LENGTH};

//! Application layer - services and command handlers.
//!
//! Services wrap the ports with the conversation rules; the turn handler
//! composes them into the per-message state machine.

pub mod handlers;
pub mod services;

pub use handlers::{
    HandleTurnCommand, HandleTurnError, HandleTurnResult, ResponseOrchestrator, TurnSettings,
};
pub use services::{
    ConversationState, ForwardOutcome, KnowledgeBase, KnowledgeError, KnowledgeRetriever,
    LeadForwarder, SessionSnapshot,
};

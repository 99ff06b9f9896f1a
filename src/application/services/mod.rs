//! Application services shared by the turn handler and the HTTP surface.

mod conversation_state;
mod knowledge_base;
mod knowledge_retriever;
mod lead_forwarder;

pub use conversation_state::{ConversationState, SessionGuard, SessionSnapshot};
pub use knowledge_base::{KnowledgeBase, KnowledgeError};
pub use knowledge_retriever::KnowledgeRetriever;
pub use lead_forwarder::{ForwardOutcome, LeadForwarder};

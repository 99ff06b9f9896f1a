//! Shared state for all HTTP handlers.

use std::sync::Arc;

use crate::application::{KnowledgeBase, ResponseOrchestrator};
use crate::ports::{ContactRepository, MessageRepository};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ResponseOrchestrator>,
    pub contacts: Arc<dyn ContactRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub knowledge: Arc<KnowledgeBase>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ResponseOrchestrator>,
        contacts: Arc<dyn ContactRepository>,
        messages: Arc<dyn MessageRepository>,
        knowledge: Arc<KnowledgeBase>,
    ) -> Self {
        Self {
            orchestrator,
            contacts,
            messages,
            knowledge,
        }
    }
}

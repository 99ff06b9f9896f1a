//! Shared wiring for integration tests: the full service over in-memory
//! adapters, a scripted model and a recording CRM.

#![allow(dead_code)]

use std::sync::Arc;

use support_chat::adapters::ai::{MockAIProvider, MockEmbeddingProvider};
use support_chat::adapters::crm::RecordingCrmGateway;
use support_chat::adapters::knowledge::InMemoryVectorIndex;
use support_chat::adapters::memory::{
    InMemoryContactRepository, InMemoryDocumentRepository, InMemoryMessageRepository,
};
use support_chat::application::{
    ConversationState, HandleTurnCommand, HandleTurnResult, KnowledgeBase, KnowledgeRetriever,
    LeadForwarder, ResponseOrchestrator,
};
use support_chat::domain::extraction::EntityExtractor;

pub struct Harness {
    pub orchestrator: Arc<ResponseOrchestrator>,
    pub knowledge: Arc<KnowledgeBase>,
    pub ai: MockAIProvider,
    pub crm: RecordingCrmGateway,
    pub contacts: Arc<InMemoryContactRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
}

impl Harness {
    pub fn new(ai: MockAIProvider) -> Self {
        Self::with_crm(ai, RecordingCrmGateway::new())
    }

    pub fn with_crm(ai: MockAIProvider, crm: RecordingCrmGateway) -> Self {
        let contacts = Arc::new(InMemoryContactRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let embedder = Arc::new(MockEmbeddingProvider::new(64));
        let index = Arc::new(InMemoryVectorIndex::new());
        let retriever = Arc::new(KnowledgeRetriever::new(embedder.clone(), index.clone()));

        let orchestrator = ResponseOrchestrator::new(
            Arc::new(ConversationState::new(contacts.clone(), messages.clone())),
            Arc::new(EntityExtractor::default()),
            retriever.clone(),
            Arc::new(ai.clone()),
            Arc::new(LeadForwarder::new(Arc::new(crm.clone()))),
        );
        let knowledge = KnowledgeBase::new(
            embedder,
            index,
            Arc::new(InMemoryDocumentRepository::new()),
            retriever,
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            knowledge: Arc::new(knowledge),
            ai,
            crm,
            contacts,
            messages,
        }
    }

    pub async fn say(&self, session: &str, message: &str) -> HandleTurnResult {
        self.orchestrator
            .handle(HandleTurnCommand::new(message, Some(session.to_string())))
            .await
            .expect("turn should be handled")
    }
}

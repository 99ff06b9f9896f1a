//! Ports - Interfaces for external dependencies.
//!
//! Every collaborator of the support-chat core sits behind one of these
//! traits; adapters provide the implementations.

mod ai_provider;
mod contact_repository;
mod crm_gateway;
mod document_repository;
mod embedding_provider;
mod message_repository;
mod vector_index;

pub use ai_provider::{
    AIError, AIProvider, CompletionPurpose, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use contact_repository::ContactRepository;
pub use crm_gateway::{CrmError, CrmGateway};
pub use document_repository::DocumentRepository;
pub use embedding_provider::{EmbeddingError, EmbeddingProvider};
pub use message_repository::MessageRepository;
pub use vector_index::{fragment_from_payload, IndexedChunk, VectorIndex, VectorIndexError};

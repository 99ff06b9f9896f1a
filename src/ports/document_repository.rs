//! Registry of knowledge-base documents.

use async_trait::async_trait;

use crate::domain::foundation::{DocumentId, DomainError};
use crate::domain::knowledge::KnowledgeDocument;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn save(&self, document: &KnowledgeDocument) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<KnowledgeDocument>, DomainError>;

    /// All documents, newest first.
    async fn list(&self) -> Result<Vec<KnowledgeDocument>, DomainError>;

    /// Returns false when no such document existed.
    async fn delete(&self, id: &DocumentId) -> Result<bool, DomainError>;
}

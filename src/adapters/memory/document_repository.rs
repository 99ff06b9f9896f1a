use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{DocumentId, DomainError};
use crate::domain::knowledge::KnowledgeDocument;
use crate::ports::DocumentRepository;

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<KnowledgeDocument>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save(&self, document: &KnowledgeDocument) -> Result<(), DomainError> {
        let mut documents = self.documents.lock().await;
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<KnowledgeDocument>, DomainError> {
        Ok(self.documents.lock().await.iter().find(|d| &d.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<KnowledgeDocument>, DomainError> {
        let mut documents = self.documents.lock().await.clone();
        documents.reverse();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool, DomainError> {
        let mut documents = self.documents.lock().await;
        let before = documents.len();
        documents.retain(|d| &d.id != id);
        Ok(documents.len() != before)
    }
}

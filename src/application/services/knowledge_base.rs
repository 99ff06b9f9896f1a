//! KnowledgeBase - corpus management on top of the vector index.
//!
//! Documents are chunked, embedded and upserted with a payload of
//! `{document_id, chunk_index, text, ..metadata}`; the registry row is only
//! written once indexing succeeded.

use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::KnowledgeRetriever;
use crate::domain::foundation::{DocumentId, DomainError, ValidationError};
use crate::domain::knowledge::{chunk_text, ChunkingPolicy, KnowledgeDocument, KnowledgeFragment};
use crate::ports::{
    DocumentRepository, EmbeddingError, EmbeddingProvider, IndexedChunk, VectorIndex,
    VectorIndexError,
};

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("document contains no text")]
    EmptyText,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index failed: {0}")]
    Index(#[from] VectorIndexError),

    #[error(transparent)]
    Repository(#[from] DomainError),
}

pub struct KnowledgeBase {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    documents: Arc<dyn DocumentRepository>,
    retriever: Arc<KnowledgeRetriever>,
    chunking: ChunkingPolicy,
}

impl KnowledgeBase {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        documents: Arc<dyn DocumentRepository>,
        retriever: Arc<KnowledgeRetriever>,
    ) -> Self {
        Self {
            embedder,
            index,
            documents,
            retriever,
            chunking: ChunkingPolicy::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingPolicy) -> Self {
        self.chunking = chunking;
        self
    }

    /// Indexes `text` under `document_id`. Returns false on any failure.
    pub async fn add_document(
        &self,
        text: &str,
        document_id: &DocumentId,
        metadata: Map<String, Value>,
    ) -> bool {
        match self.index_text(text, document_id, metadata).await {
            Ok(chunks) => {
                tracing::info!(document_id = %document_id, chunks, "document indexed");
                true
            }
            Err(err) => {
                tracing::error!(document_id = %document_id, error = %err, "document indexing failed");
                false
            }
        }
    }

    async fn index_text(
        &self,
        text: &str,
        document_id: &DocumentId,
        metadata: Map<String, Value>,
    ) -> Result<usize, KnowledgeError> {
        let chunks = chunk_text(text, self.chunking);
        if chunks.is_empty() {
            return Err(KnowledgeError::EmptyText);
        }

        let vectors = self.embedder.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(EmbeddingError::Parse(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            ))
            .into());
        }

        let points: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (chunk, vector))| {
                let mut payload = metadata.clone();
                payload.insert("document_id".to_string(), Value::from(document_id.to_string()));
                payload.insert("chunk_index".to_string(), Value::from(chunk_index));
                payload.insert("text".to_string(), Value::from(chunk));
                IndexedChunk {
                    id: Uuid::new_v4(),
                    vector,
                    payload,
                }
            })
            .collect();

        let count = points.len();
        self.index.upsert(points).await?;
        Ok(count)
    }

    /// Semantic search over the corpus.
    pub async fn search(&self, query: &str, limit: usize, score_threshold: f32) -> Vec<KnowledgeFragment> {
        self.retriever.retrieve(query, limit, score_threshold).await
    }

    /// Removes every chunk of the document from the index. Returns false on failure.
    pub async fn delete_document(&self, document_id: &DocumentId) -> bool {
        match self.index.delete_document(document_id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(document_id = %document_id, error = %err, "document vector deletion failed");
                false
            }
        }
    }

    /// Indexes a plain-text document and records it in the registry.
    pub async fn register_document(
        &self,
        name: &str,
        file_type: &str,
        text: &str,
        metadata: Map<String, Value>,
    ) -> Result<KnowledgeDocument, KnowledgeError> {
        let mut document = KnowledgeDocument::new(name, file_type, text)?;

        let mut metadata = metadata;
        metadata.insert("filename".to_string(), Value::from(document.name.clone()));
        metadata.insert("file_type".to_string(), Value::from(document.file_type.clone()));

        let chunks = self.index_text(text, &document.id, metadata).await?;
        document.chunk_count = i32::try_from(chunks).unwrap_or(i32::MAX);
        self.documents.save(&document).await?;

        tracing::info!(document_id = %document.id, name = %document.name, chunks, "document registered");
        Ok(document)
    }

    pub async fn list_documents(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeError> {
        Ok(self.documents.list().await?)
    }

    /// Deletes the document's vectors, then its registry row.
    pub async fn remove_document(&self, document_id: &DocumentId) -> Result<(), KnowledgeError> {
        if self.documents.find_by_id(document_id).await?.is_none() {
            return Err(KnowledgeError::NotFound(*document_id));
        }
        self.index.delete_document(document_id).await?;
        self.documents.delete(document_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockEmbeddingProvider;
    use crate::adapters::knowledge::InMemoryVectorIndex;
    use crate::adapters::memory::InMemoryDocumentRepository;

    struct Fixture {
        kb: KnowledgeBase,
        index: Arc<InMemoryVectorIndex>,
        embedder: MockEmbeddingProvider,
    }

    fn fixture() -> Fixture {
        let embedder = MockEmbeddingProvider::new(32);
        let index = Arc::new(InMemoryVectorIndex::new());
        let retriever = Arc::new(KnowledgeRetriever::new(Arc::new(embedder.clone()), index.clone()));
        let kb = KnowledgeBase::new(
            Arc::new(embedder.clone()),
            index.clone(),
            Arc::new(InMemoryDocumentRepository::new()),
            retriever,
        )
        .with_chunking(ChunkingPolicy {
            chunk_size: 40,
            chunk_overlap: 10,
        });
        Fixture { kb, index, embedder }
    }

    const TEXT: &str = "Школа работает с 10 до 21.\n\nKarena Zhou ведёт вокал по вторникам.\n\nПервое занятие бесплатно.";

    #[tokio::test]
    async fn add_document_indexes_chunks_with_payload() {
        let f = fixture();
        let id = DocumentId::new();
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from("faq"));

        assert!(f.kb.add_document(TEXT, &id, metadata).await);

        let hits = f.kb.search("кто такая Karena Zhou", 3, 0.0).await;
        assert!(!hits.is_empty());
        assert!(hits[0].text.contains("Karena Zhou"));
        assert_eq!(hits[0].document_id(), Some(id.to_string().as_str()));
        assert_eq!(hits[0].metadata.get("source"), Some(&Value::from("faq")));
        assert!(hits[0].chunk_index().is_some());
    }

    #[tokio::test]
    async fn add_document_reports_failure() {
        let f = fixture();
        f.embedder.set_failing(true);
        assert!(!f.kb.add_document(TEXT, &DocumentId::new(), Map::new()).await);
        assert!(!f.kb.add_document("   ", &DocumentId::new(), Map::new()).await);
    }

    #[tokio::test]
    async fn register_then_remove_document() {
        let f = fixture();
        let document = f.kb.register_document("faq.txt", "", TEXT, Map::new()).await.unwrap();

        assert_eq!(document.file_type, "txt");
        assert!(document.chunk_count >= 3);
        assert_eq!(f.index.len().await, document.chunk_count as usize);
        assert_eq!(f.kb.list_documents().await.unwrap().len(), 1);

        f.kb.remove_document(&document.id).await.unwrap();

        assert!(f.index.is_empty().await);
        assert!(f.kb.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_document_is_not_found() {
        let f = fixture();
        let err = f.kb.remove_document(&DocumentId::new()).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_indexing_registers_nothing() {
        let f = fixture();
        f.embedder.set_failing(true);
        let err = f.kb.register_document("faq.txt", "txt", TEXT, Map::new()).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::Embedding(_)));
        assert!(f.kb.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_document_removes_vectors() {
        let f = fixture();
        let id = DocumentId::new();
        f.kb.add_document(TEXT, &id, Map::new()).await;
        assert!(f.kb.delete_document(&id).await);
        assert!(f.index.is_empty().await);
    }
}

//! PostgreSQL implementation of DocumentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{DocumentId, DomainError, Timestamp};
use crate::domain::knowledge::KnowledgeDocument;
use crate::ports::DocumentRepository;

#[derive(Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn save(&self, document: &KnowledgeDocument) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, name, file_type, file_size, chunk_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                file_type = EXCLUDED.file_type,
                file_size = EXCLUDED.file_size,
                chunk_count = EXCLUDED.chunk_count
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(&document.name)
        .bind(&document.file_type)
        .bind(document.file_size)
        .bind(document.chunk_count)
        .bind(document.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save document", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<KnowledgeDocument>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, file_type, file_size, chunk_count, created_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch document", e))?;

        row.map(|r| row_to_document(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<KnowledgeDocument>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, file_type, file_size, chunk_count, created_at
            FROM documents
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list documents", e))?;

        rows.iter().map(row_to_document).collect()
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete document", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_document(row: &PgRow) -> Result<KnowledgeDocument, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read document row", e);
    let id: Uuid = row.try_get("id").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(KnowledgeDocument {
        id: DocumentId::from_uuid(id),
        name: row.try_get("name").map_err(read)?,
        file_type: row.try_get("file_type").map_err(read)?,
        file_size: row.try_get("file_size").map_err(read)?,
        chunk_count: row.try_get("chunk_count").map_err(read)?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

//! PostgreSQL implementation of MessageRepository.
//!
//! Ordering is `created_at` with the `seq` identity column as tiebreaker,
//! so turns stored within the same clock tick keep insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::db_error;
use crate::domain::conversation::TurnRecord;
use crate::domain::foundation::{ContactId, DomainError, MessageId, SessionId, Timestamp};
use crate::ports::MessageRepository;

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, record: &TurnRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, contact_id, session_id, message, response, is_from_user, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.contact_id.as_ref().map(|c| *c.as_uuid()))
        .bind(record.session_id.as_str())
        .bind(&record.message)
        .bind(record.response.as_deref())
        .bind(record.is_from_user)
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert message", e))?;

        Ok(())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<TurnRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, contact_id, session_id, message, response, is_from_user, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch session messages", e))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn link_session(
        &self,
        session_id: &SessionId,
        contact_id: &ContactId,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET contact_id = $2
            WHERE session_id = $1 AND contact_id IS NULL
            "#,
        )
        .bind(session_id.as_str())
        .bind(contact_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to link session messages", e))?;

        Ok(result.rows_affected())
    }

    async fn list_by_contact(&self, contact_id: &ContactId) -> Result<Vec<TurnRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, contact_id, session_id, message, response, is_from_user, created_at
            FROM messages
            WHERE contact_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(contact_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch contact messages", e))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<TurnRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, contact_id, session_id, message, response, is_from_user, created_at
            FROM messages
            ORDER BY created_at DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch recent messages", e))?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &PgRow) -> Result<TurnRecord, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read message row", e);
    let id: Uuid = row.try_get("id").map_err(read)?;
    let contact_id: Option<Uuid> = row.try_get("contact_id").map_err(read)?;
    let session_id: String = row.try_get("session_id").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(TurnRecord {
        id: MessageId::from_uuid(id),
        session_id: SessionId::parse(session_id)?,
        contact_id: contact_id.map(ContactId::from_uuid),
        message: row.try_get("message").map_err(read)?,
        response: row.try_get("response").map_err(read)?,
        is_from_user: row.try_get("is_from_user").map_err(read)?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

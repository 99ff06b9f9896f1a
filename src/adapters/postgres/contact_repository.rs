//! PostgreSQL implementation of ContactRepository.
//!
//! Phone-keyed upserts run in one transaction: an `INSERT ... ON CONFLICT DO
//! NOTHING` guarantees the row exists, then `SELECT ... FOR UPDATE` serializes
//! concurrent merges on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::db_error;
use crate::domain::contact::{Contact, MergeOutcome};
use crate::domain::extraction::CandidateFields;
use crate::domain::foundation::{ContactId, DomainError, ErrorCode, Timestamp};
use crate::ports::ContactRepository;

#[derive(Clone)]
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: &Uuid,
    ) -> Result<Option<Contact>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, created_at
            FROM contacts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to lock contact", e))?;

        Ok(row.map(|r| row_to_contact(&r)).transpose()?)
    }

    async fn write_fields(
        tx: &mut Transaction<'_, Postgres>,
        contact: &Contact,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE contacts SET name = $2, phone = $3 WHERE id = $1")
            .bind(contact.id.as_uuid())
            .bind(contact.name.as_deref())
            .bind(contact.phone.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to update contact", e))?;
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError> {
        let row = sqlx::query("SELECT id, name, phone, created_at FROM contacts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch contact", e))?;

        row.map(|r| row_to_contact(&r)).transpose()
    }

    async fn create(&self, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, name, phone, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(contact.name.as_deref())
        .bind(contact.phone.as_deref())
        .bind(contact.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert contact", e))?;

        Ok(())
    }

    async fn upsert_by_phone(
        &self,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError> {
        let phone = candidates.phone.as_deref().ok_or_else(|| {
            DomainError::new(ErrorCode::ValidationFailed, "upsert_by_phone requires a phone")
        })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO contacts (id, name, phone, created_at)
            VALUES ($1, NULL, $2, $3)
            ON CONFLICT (phone) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(phone)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert contact", e))?
        .rows_affected()
            == 1;

        let row = sqlx::query(
            r#"
            SELECT id, name, phone, created_at
            FROM contacts
            WHERE phone = $1
            FOR UPDATE
            "#,
        )
        .bind(phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock contact by phone", e))?;
        let current = row_to_contact(&row)?;

        let mut outcome = current.merge(candidates);
        if inserted {
            outcome.newly_filled.phone = true;
        }
        if outcome.newly_filled.any() {
            Self::write_fields(&mut tx, &outcome.contact).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit contact upsert", e))?;

        Ok(outcome)
    }

    async fn merge_into(
        &self,
        id: &ContactId,
        candidates: &CandidateFields,
    ) -> Result<MergeOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let current = Self::lock_by_id(&mut tx, id.as_uuid())
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ContactNotFound, format!("Contact not found: {}", id))
            })?;

        let outcome = current.merge(candidates);
        if outcome.newly_filled.any() {
            Self::write_fields(&mut tx, &outcome.contact).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit contact merge", e))?;

        Ok(outcome)
    }

    async fn list_newest_first(&self) -> Result<Vec<Contact>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, created_at
            FROM contacts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contacts", e))?;

        rows.iter().map(row_to_contact).collect()
    }
}

fn row_to_contact(row: &PgRow) -> Result<Contact, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read contact row", e);
    let id: Uuid = row.try_get("id").map_err(read)?;
    let name: Option<String> = row.try_get("name").map_err(read)?;
    let phone: Option<String> = row.try_get("phone").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(Contact::reconstitute(
        ContactId::from_uuid(id),
        name,
        phone,
        Timestamp::from_datetime(created_at),
    ))
}

//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresContactRepository` - contacts deduplicated by phone
//! - `PostgresMessageRepository` - per-session turn history
//! - `PostgresDocumentRepository` - knowledge document registry

mod contact_repository;
mod document_repository;
mod message_repository;

pub use contact_repository::PostgresContactRepository;
pub use document_repository::PostgresDocumentRepository;
pub use message_repository::PostgresMessageRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Maps a sqlx error, turning unique-constraint violations into `Conflict`.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    let unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");

    if unique_violation {
        DomainError::new(ErrorCode::Conflict, format!("{}: {}", context, err))
    } else {
        DomainError::database(format!("{}: {}", context, err))
    }
}

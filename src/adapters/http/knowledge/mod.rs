//! HTTP adapter for knowledge-base management and search.

mod dto;
mod handlers;
mod routes;

pub use dto::{DocumentResponse, RegisterDocumentRequest, SearchRequest, SearchResponse};
pub use handlers::{delete_document, list_documents, register_document, search};
pub use routes::knowledge_router;

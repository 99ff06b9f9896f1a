//! HTTP adapter for the visitor chat endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{ChatRequest, ChatResponse};
pub use handlers::post_chat;
pub use routes::chat_router;

//! HTTP adapter for the read-only admin views of contacts and messages.

mod dto;
mod handlers;
mod routes;

pub use dto::{ContactResponse, MessageResponse, RecentMessagesQuery};
pub use handlers::{list_contact_messages, list_contacts, list_recent_messages};
pub use routes::admin_router;

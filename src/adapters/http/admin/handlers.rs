//! HTTP handlers for admin endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::domain::foundation::ContactId;

use super::dto::{ContactResponse, MessageResponse, RecentMessagesQuery};

const MAX_RECENT: u32 = 1000;

/// GET /api/admin/contacts - All contacts, newest first
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let contacts = state.contacts.list_newest_first().await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/contacts/:id/messages - One contact's messages in conversation order
pub async fn list_contact_messages(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let contact_id: ContactId = contact_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid contact ID".to_string()))?;

    if state.contacts.find_by_id(&contact_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Contact not found: {}", contact_id)));
    }

    let messages = state.messages.list_by_contact(&contact_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/messages?limit=N - Most recent messages across sessions
pub async fn list_recent_messages(
    State(state): State<AppState>,
    Query(query): Query<RecentMessagesQuery>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let limit = query.limit.clamp(1, MAX_RECENT);
    let messages = state.messages.list_recent(limit).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

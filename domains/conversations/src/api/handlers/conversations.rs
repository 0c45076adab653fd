//! Conversation management API handlers

use axum::{extract::State, Json};
use bahl_common::{Error, Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::extractors::ConversationPath;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{
    Conversation, ConversationId, ConversationSummary, Message, MessageRole,
};

/// Request for renaming a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct RenameConversationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

/// Response for creating a conversation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    pub conversation_id: ConversationId,
    pub title: String,
}

/// Conversation list entry DTO
#[derive(Debug, Serialize)]
pub struct ConversationSummaryResponse {
    pub id: ConversationId,
    pub title: String,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
        }
    }
}

/// Message DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            role: m.role,
            content: m.content,
            timestamp: m.timestamp,
        }
    }
}

/// Full conversation DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            title: c.title,
            created_at: c.created_at,
            messages: c.messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// Acknowledgement for mutations that return no data
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Create a new conversation
pub async fn create_conversation(
    State(state): State<ConversationsState>,
) -> Result<Json<CreateConversationResponse>> {
    let created = state.store.create().await?;

    tracing::info!(conversation_id = %created.id, title = %created.title, "Conversation created");

    Ok(Json(CreateConversationResponse {
        conversation_id: created.id,
        title: created.title,
    }))
}

/// List all conversations, newest first
pub async fn list_conversations(
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationSummaryResponse>>> {
    let convs = state.store.list().await?;

    let responses: Vec<ConversationSummaryResponse> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single conversation with its messages
pub async fn get_conversation(
    State(state): State<ConversationsState>,
    ConversationPath(id): ConversationPath,
) -> Result<Json<ConversationResponse>> {

    let conv = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    Ok(Json(conv.into()))
}

/// Rename a conversation.
///
/// Reports success even when the id matches nothing; no record is created.
pub async fn rename_conversation(
    State(state): State<ConversationsState>,
    ConversationPath(id): ConversationPath,
    ValidatedJson(req): ValidatedJson<RenameConversationRequest>,
) -> Result<Json<SuccessResponse>> {
    Conversation::validate_title(&req.title)?;

    if !state.store.rename(id, &req.title).await? {
        tracing::warn!(conversation_id = %id, "Rename matched no conversation");
    }

    Ok(SuccessResponse::ok())
}

/// Delete a conversation and its messages.
///
/// Reports success even when the id matches nothing.
pub async fn delete_conversation(
    State(state): State<ConversationsState>,
    ConversationPath(id): ConversationPath,
) -> Result<Json<SuccessResponse>> {

    if state.store.delete(id).await? {
        tracing::info!(conversation_id = %id, "Conversation deleted");
    } else {
        tracing::warn!(conversation_id = %id, "Delete matched no conversation");
    }

    Ok(SuccessResponse::ok())
}

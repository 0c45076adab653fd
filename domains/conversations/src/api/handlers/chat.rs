//! Chat turn API handler

use axum::{extract::State, Json};
use bahl_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::ConversationId;

/// Request for one chat turn
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub message: String,

    #[validate(length(min = 1))]
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Send a user message and return the model's reply
pub async fn send_message(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let conversation_id: ConversationId = req.conversation_id.parse()?;

    tracing::info!(
        conversation_id = %conversation_id,
        message_len = req.message.len(),
        "Chat turn started"
    );

    let reply = state.chat.send_message(conversation_id, req.message).await?;

    Ok(Json(ChatResponse { reply }))
}

//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{chat, conversations};
use super::middleware::ConversationsState;

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/new-chat", post(conversations::create_conversation))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversation/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route(
            "/conversation/{id}/rename",
            put(conversations::rename_conversation),
        )
}

/// Create chat routes
fn chat_routes() -> Router<ConversationsState> {
    Router::new().route("/chat", post(chat::send_message))
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(chat_routes())
}

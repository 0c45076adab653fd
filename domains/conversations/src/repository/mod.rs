//! Conversation store implementations for Conversations domain

pub mod memory;
pub mod postgres;

use bahl_common::Result;

use crate::domain::entities::{Conversation, ConversationId, ConversationSummary, Message};

pub use memory::InMemoryConversationStore;
pub use postgres::PgConversationStore;

/// Durable persistence of conversations and their messages.
///
/// Each operation touches a single conversation document and is atomic at
/// that level; nothing spans documents.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation titled "Chat N"
    async fn create(&self) -> Result<Conversation>;

    /// All conversations, newest first
    async fn list(&self) -> Result<Vec<ConversationSummary>>;

    /// Full conversation including messages
    async fn find(&self, id: ConversationId) -> Result<Option<Conversation>>;

    /// Overwrite the title; returns whether a conversation was updated
    async fn rename(&self, id: ConversationId, title: &str) -> Result<bool>;

    /// Remove the conversation and its messages; returns whether one existed
    async fn delete(&self, id: ConversationId) -> Result<bool>;

    /// Append to the message list; returns whether the conversation exists
    async fn append_message(&self, id: ConversationId, message: &Message) -> Result<bool>;
}

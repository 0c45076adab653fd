//! In-process conversation store
//!
//! Backs the API when no database is configured and in tests. Contents are
//! lost when the process exits.

use bahl_common::Result;
use tokio::sync::RwLock;

use super::ConversationStore;
use crate::domain::entities::{Conversation, ConversationId, ConversationSummary, Message};

#[derive(Default)]
pub struct InMemoryConversationStore {
    // Insertion order; listing sorts a reversed copy so ties stay newest-first
    conversations: RwLock<Vec<Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> Result<Conversation> {
        let mut conversations = self.conversations.write().await;
        let conversation =
            Conversation::new(Conversation::default_title(conversations.len() as u64));
        conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let conversations = self.conversations.read().await;
        let mut newest_first: Vec<&Conversation> = conversations.iter().rev().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(newest_first.into_iter().map(Conversation::summary).collect())
    }

    async fn find(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let conversations = self.conversations.read().await;
        Ok(conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn rename(&self, id: ConversationId, title: &str) -> Result<bool> {
        let mut conversations = self.conversations.write().await;
        match conversations.iter_mut().find(|c| c.id == id) {
            Some(conversation) => {
                conversation.title = title.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ConversationId) -> Result<bool> {
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        Ok(conversations.len() < before)
    }

    async fn append_message(&self, id: ConversationId, message: &Message) -> Result<bool> {
        let mut conversations = self.conversations.write().await;
        match conversations.iter_mut().find(|c| c.id == id) {
            Some(conversation) => {
                conversation.messages.push(message.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

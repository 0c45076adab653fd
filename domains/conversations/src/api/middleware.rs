//! Conversations domain state

use crate::domain::chat::ChatOrchestrator;
use crate::repository::ConversationStore;
use std::sync::Arc;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub store: Arc<dyn ConversationStore>,
    pub chat: Arc<ChatOrchestrator>,
}

impl ConversationsState {
    pub fn new(store: Arc<dyn ConversationStore>, chat: ChatOrchestrator) -> Self {
        Self {
            store,
            chat: Arc::new(chat),
        }
    }
}

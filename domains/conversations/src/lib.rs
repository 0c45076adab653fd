//! Conversations domain: persisted chat threads and the chat turn

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::chat::ChatOrchestrator;
pub use domain::entities::{
    Conversation, ConversationId, ConversationSummary, Message, MessageRole,
};

// Re-export repository types
pub use repository::{ConversationStore, InMemoryConversationStore, PgConversationStore};

// Re-export API types
pub use api::routes::routes;
pub use api::ConversationsState;

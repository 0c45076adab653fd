//! HTTP API for Conversations domain

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ConversationsState;

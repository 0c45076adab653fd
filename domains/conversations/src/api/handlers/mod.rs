//! Request handlers for Conversations domain

pub mod chat;
pub mod conversations;

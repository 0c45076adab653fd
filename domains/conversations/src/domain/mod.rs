//! Domain layer for Conversations

pub mod chat;
pub mod entities;

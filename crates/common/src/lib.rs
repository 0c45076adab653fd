//! Shared utilities, configuration, and error handling for Bahl AI
//!
//! This crate provides common functionality used across the backend:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP rendering
//! - Custom axum extractors

pub mod config;
pub mod error;
pub mod extractors;

pub use config::{Config, LogFormat, StoreBackend};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;

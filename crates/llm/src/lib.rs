//! Bahl AI LLM Service
//!
//! Provides chat completion with support for:
//! - OpenAI-compatible Chat Completions API for production
//! - Mock service for local development
//! - Scripted service for tests (`test-support` feature)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod openai;

#[cfg(any(test, feature = "test-support"))]
pub mod scripted;

pub use mock::MockLlmService;
pub use openai::OpenAiService;

#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedLlmService;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("LLM response error: {0}")]
    Response(String),
}

/// Role of a message sent to the completion service.
///
/// Only the current user turn is ever sent; stored bot replies are not
/// replayed, so there is no assistant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }
}

/// Completion request; an empty `model` selects the service default
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// LLM service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider (openai, mock)
    pub provider: String,
    /// API key for the provider
    pub api_key: String,
    /// Override for the provider base URL (proxies, compatible servers, tests)
    pub base_url: Option<String>,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Optional completion token cap
    pub max_tokens: Option<u32>,
    /// Upper bound on a single completion call
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create LLM config from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build LLM config from an arbitrary key lookup.
    ///
    /// Blank values count as unset, so an untouched `.env` template falls
    /// back to the defaults instead of producing an unusable client.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let provider = value("LLM_PROVIDER")
            .map(|raw| raw.to_lowercase())
            .unwrap_or_else(|| "openai".to_string());

        let api_key = value("OPENAI_API_KEY").unwrap_or_default();
        if provider == "openai" && api_key.is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_API_KEY is required when LLM_PROVIDER=openai".to_string(),
            ));
        }

        let base_url = value("OPENAI_BASE_URL");
        if let Some(url) = &base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(LlmError::Configuration(format!(
                    "OPENAI_BASE_URL must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        let default_model = value("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = value("LLM_MAX_TOKENS")
            .map(|raw| positive_number::<u32>("LLM_MAX_TOKENS", &raw))
            .transpose()?;

        let timeout_secs = value("LLM_TIMEOUT_SECS")
            .map(|raw| positive_number::<u64>("LLM_TIMEOUT_SECS", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            provider,
            api_key,
            base_url,
            default_model,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Configuration for the mock provider
    pub fn mock() -> Self {
        Self {
            provider: "mock".to_string(),
            api_key: String::new(),
            base_url: None,
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn positive_number<T>(key: &str, raw: &str) -> Result<T, LlmError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(LlmError::Configuration(format!(
            "{} must be a positive number, got '{}'",
            key, raw
        ))),
    }
}

/// LLM service trait for different providers
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Generate a single reply for the given request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// LLM service factory
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create LLM service based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "openai" => {
                tracing::info!(model = %config.default_model, "Creating OpenAI LLM service");
                Ok(Box::new(OpenAiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Box::new(MockLlmService::new()))
            }
            other => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

//! Bahl AI application composition root
//!
//! Builds the long-lived clients once at startup, composes the domain
//! router and provides the shared HTTP layers.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use bahl_common::{Config, LogFormat, StoreBackend};
use bahl_conversations::{
    ChatOrchestrator, ConversationStore, ConversationsState, InMemoryConversationStore,
    PgConversationStore,
};
use bahl_llm::{LlmConfig, LlmService, LlmServiceFactory};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

/// Maximum accepted request body size
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Clients shared by every request, initialized at startup and closed at shutdown
pub struct AppServices {
    pub store: Arc<dyn ConversationStore>,
    pub llm: Arc<dyn LlmService>,
    pg: Option<PgConversationStore>,
}

impl AppServices {
    /// Connect the configured store and build the completion client
    pub async fn init(config: &Config, llm_config: LlmConfig) -> anyhow::Result<Self> {
        let (store, pg): (Arc<dyn ConversationStore>, Option<PgConversationStore>) =
            match config.store_backend {
                StoreBackend::Postgres => {
                    let url = config
                        .database_url
                        .as_deref()
                        .context("DATABASE_URL is required for the postgres store")?;
                    let pg = PgConversationStore::connect(url)
                        .await
                        .context("Database connection failed")?;
                    tracing::info!("PostgreSQL conversation store ready");
                    (Arc::new(pg.clone()) as Arc<dyn ConversationStore>, Some(pg))
                }
                StoreBackend::Memory => {
                    tracing::warn!("Using in-memory conversation store; data is lost on exit");
                    (
                        Arc::new(InMemoryConversationStore::new()) as Arc<dyn ConversationStore>,
                        None,
                    )
                }
            };

        let llm = LlmServiceFactory::create(llm_config).context("LLM service setup failed")?;

        Ok(Self {
            store,
            llm: Arc::from(llm),
            pg,
        })
    }

    /// Release pooled connections
    pub async fn shutdown(&self) {
        if let Some(pg) = &self.pg {
            pg.close().await;
            tracing::info!("Database connections closed");
        }
    }
}

/// Create the main application router with all routes
pub fn create_app(
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
    system_prompt: &str,
) -> Router {
    let chat = ChatOrchestrator::new(store.clone(), llm, system_prompt);
    let conversations_state = ConversationsState::new(store, chat);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(bahl_conversations::routes().with_state(conversations_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// CORS policy: permissive without an allow-list, otherwise exact origins
pub fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let Some(raw) = allowed_origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Reject oversized request bodies
pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init(),
    }
}

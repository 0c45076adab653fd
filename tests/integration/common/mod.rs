//! Common test utilities and fixtures for integration tests
//!
//! This module provides shared infrastructure for all integration tests including:
//! - Router setup over the in-memory store
//! - Scripted completion service wiring
//! - Request builders and body parsing

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use bahl_conversations::{ConversationId, ConversationStore, InMemoryConversationStore};
use bahl_llm::ScriptedLlmService;
use serde_json::Value;
use tower::ServiceExt;

pub const SYSTEM_PROMPT: &str = "You are Bahl AI.";

/// Test application: real router, in-memory store, scripted LLM
pub struct TestApp {
    pub store: Arc<InMemoryConversationStore>,
    pub llm: ScriptedLlmService,
    router: Router,
}

impl TestApp {
    /// App whose completion service always replies with `reply`
    pub fn replying(reply: &str) -> Self {
        Self::with_llm(ScriptedLlmService::replying(reply))
    }

    pub fn with_llm(llm: ScriptedLlmService) -> Self {
        let store = Arc::new(InMemoryConversationStore::new());
        let router = bahl_app::create_app(store.clone(), Arc::new(llm.clone()), SYSTEM_PROMPT);
        Self { store, llm, router }
    }

    /// Send one request through a fresh clone of the router
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// POST /new-chat and return the new conversation id
    pub async fn create_conversation(&self) -> String {
        let resp = self.send(json_request(Method::POST, "/new-chat", None)).await;
        let body = parse_body(resp).await;
        body["conversationId"].as_str().unwrap().to_string()
    }

    /// Stored message count, read straight from the store
    pub async fn message_count(&self, id: &str) -> usize {
        let id: ConversationId = id.parse().unwrap();
        self.store
            .find(id)
            .await
            .unwrap()
            .map(|c| c.messages.len())
            .unwrap_or(0)
    }
}

/// Build a request with an optional JSON body
pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(b) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

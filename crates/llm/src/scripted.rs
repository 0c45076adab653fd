//! Scripted LLM Service for tests
//!
//! Replays queued replies or failures in order and records every request
//! it receives so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

type Outcome = Result<String, LlmError>;

#[derive(Debug, Clone, Default)]
pub struct ScriptedLlmService {
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Option<Outcome>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedLlmService {
    /// Service that answers every request with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(Ok(reply.into())),
            ..Self::default()
        }
    }

    /// Service that fails every request with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            fallback: Some(Err(error)),
            ..Self::default()
        }
    }

    /// Queue a one-off reply ahead of the fallback
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a one-off failure ahead of the fallback
    pub fn then_fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn push(&self, outcome: Outcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }

    fn next_outcome(&self) -> Outcome {
        let queued = self.outcomes.lock().ok().and_then(|mut o| o.pop_front());
        queued
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(LlmError::Response("No scripted response left".to_string())))
    }
}

#[async_trait::async_trait]
impl LlmService for ScriptedLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.default_model().to_string()
        } else {
            request.model.clone()
        };

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let content = self.next_outcome()?;
        Ok(CompletionResponse {
            content,
            model,
            input_tokens: 0,
            output_tokens: 0,
            stop_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

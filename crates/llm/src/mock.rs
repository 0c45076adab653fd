//! Offline completion provider, selected with `LLM_PROVIDER=mock`.
//!
//! Replies are built from the request itself: the persona line from the
//! system prompt followed by the user's message. Lets a frontend run whole
//! chat turns locally without an API key or network access.

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmRole, LlmService};

const MOCK_MODEL: &str = "mock-model";
const DEFAULT_PERSONA: &str = "Bahl AI";

#[derive(Debug, Clone, Default)]
pub struct MockLlmService;

impl MockLlmService {
    pub fn new() -> Self {
        Self
    }

    fn persona(request: &CompletionRequest) -> &str {
        request
            .system_prompt
            .as_deref()
            .and_then(|prompt| prompt.lines().map(str::trim).find(|line| !line.is_empty()))
            .unwrap_or(DEFAULT_PERSONA)
    }
}

/// Rough token estimate: whitespace-separated words
fn word_count(text: &str) -> i32 {
    text.split_whitespace().count() as i32
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let question = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == LlmRole::User)
            .map(|m| m.content.trim())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::Response("no user message to answer".to_string()))?;

        let full_reply = format!("[{}] You said: {}", Self::persona(&request), question);

        // Honour the token cap the same way a real provider cuts a reply short
        let (content, stop_reason) = match request.max_tokens {
            Some(cap) if word_count(&full_reply) > cap as i32 => (
                full_reply
                    .split_whitespace()
                    .take(cap as usize)
                    .collect::<Vec<_>>()
                    .join(" "),
                "length",
            ),
            _ => (full_reply, "stop"),
        };

        let input_tokens = word_count(request.system_prompt.as_deref().unwrap_or(""))
            + request.messages.iter().map(|m| word_count(&m.content)).sum::<i32>();

        tracing::debug!(input_tokens, stop_reason, "Mock completion generated");

        Ok(CompletionResponse {
            output_tokens: word_count(&content),
            content,
            model: if request.model.is_empty() {
                MOCK_MODEL.to_string()
            } else {
                request.model
            },
            input_tokens,
            stop_reason: stop_reason.to_string(),
        })
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }
}

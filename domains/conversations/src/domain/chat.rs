//! Chat turn orchestration
//!
//! One turn: persist the user message, ask the completion service for a
//! reply, persist the reply. Steps run sequentially with no rollback, so a
//! failed completion leaves the user message in place.

use std::sync::Arc;

use bahl_common::{Error, Result};
use bahl_llm::{CompletionRequest, LlmError, LlmMessage, LlmService};

use crate::domain::entities::{ConversationId, Message};
use crate::repository::ConversationStore;

pub struct ChatOrchestrator {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            store,
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// Run one chat turn and return the generated reply.
    ///
    /// Only the current message is sent to the completion service; earlier
    /// turns of the conversation are not included as context.
    pub async fn send_message(&self, conversation_id: ConversationId, text: String) -> Result<String> {
        let user_message = Message::user(text)?;

        if !self.store.append_message(conversation_id, &user_message).await? {
            return Err(Error::NotFound("Conversation not found".to_string()));
        }

        let request = CompletionRequest {
            model: String::new(),
            system_prompt: Some(self.system_prompt.clone()),
            messages: vec![LlmMessage::user(user_message.content)],
            max_tokens: None,
        };

        let response = self.llm.complete(request).await.map_err(|e| {
            tracing::warn!(
                conversation_id = %conversation_id,
                error = %e,
                "Completion failed; user message kept without a reply"
            );
            completion_error(e)
        })?;

        tracing::debug!(
            conversation_id = %conversation_id,
            model = %response.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Completion received"
        );

        let reply = response.content;
        if !self
            .store
            .append_message(conversation_id, &Message::bot(reply.as_str()))
            .await?
        {
            // Deleted while the completion was in flight
            tracing::warn!(conversation_id = %conversation_id, "Conversation vanished before reply was stored");
        }

        Ok(reply)
    }
}

fn completion_error(err: LlmError) -> Error {
    match err {
        LlmError::Configuration(msg) => Error::Internal(format!("LLM misconfigured: {}", msg)),
        other => Error::ExternalService(other.to_string()),
    }
}

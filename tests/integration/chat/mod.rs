//! Chat turn endpoint integration tests

use axum::http::{Method, StatusCode};
use bahl_llm::{LlmError, ScriptedLlmService};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{json_request, parse_body, TestApp, SYSTEM_PROMPT};

async fn chat(app: &TestApp, conversation_id: &str, message: &str) -> (StatusCode, Value) {
    let resp = app
        .send(json_request(
            Method::POST,
            "/chat",
            Some(json!({"message": message, "conversationId": conversation_id})),
        ))
        .await;
    let status = resp.status();
    (status, parse_body(resp).await)
}

async fn messages(app: &TestApp, conversation_id: &str) -> Vec<Value> {
    let resp = app
        .send(json_request(
            Method::GET,
            &format!("/conversation/{}", conversation_id),
            None,
        ))
        .await;
    parse_body(resp).await["messages"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

mod test_send_message {
    use super::*;

    #[tokio::test]
    async fn test_chat_returns_reply_and_stores_both_turns() {
        let app = TestApp::replying("hi there");
        let id = app.create_conversation().await;

        let (status, body) = chat(&app, &id, "hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"reply": "hi there"}));

        let stored = messages(&app, &id).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["role"], "user");
        assert_eq!(stored[0]["content"], "hello");
        assert_eq!(stored[1]["role"], "bot");
        assert_eq!(stored[1]["content"], "hi there");
        assert!(stored[0]["timestamp"].is_string());
        assert!(stored[1]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_each_turn_adds_exactly_two_messages() {
        let app = TestApp::with_llm(
            ScriptedLlmService::replying("later")
                .then_reply("one")
                .then_reply("two"),
        );
        let id = app.create_conversation().await;

        chat(&app, &id, "first").await;
        assert_eq!(app.message_count(&id).await, 2);

        chat(&app, &id, "second").await;
        assert_eq!(app.message_count(&id).await, 4);

        let contents: Vec<String> = messages(&app, &id)
            .await
            .iter()
            .map(|m| m["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(contents, vec!["first", "one", "second", "two"]);
    }

    #[tokio::test]
    async fn test_completion_receives_persona_and_current_message_only() {
        let app = TestApp::replying("ok");
        let id = app.create_conversation().await;

        chat(&app, &id, "earlier question").await;
        chat(&app, &id, "follow-up").await;

        let requests = app.llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].system_prompt.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(requests[1].messages.len(), 1);
        assert_eq!(requests[1].messages[0].content, "follow-up");
    }

    #[tokio::test]
    async fn test_turns_in_separate_conversations_stay_separate() {
        let app = TestApp::replying("ok");
        let a = app.create_conversation().await;
        let b = app.create_conversation().await;

        chat(&app, &a, "for a").await;

        assert_eq!(app.message_count(&a).await, 2);
        assert_eq!(app.message_count(&b).await, 0);
    }
}

mod test_completion_failures {
    use super::*;

    #[tokio::test]
    async fn test_failed_completion_returns_502_and_keeps_user_message() {
        let app = TestApp::with_llm(ScriptedLlmService::failing(LlmError::Request(
            "connection refused".to_string(),
        )));
        let id = app.create_conversation().await;

        let (status, body) = chat(&app, &id, "hello").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));

        let stored = messages(&app, &id).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["role"], "user");
        assert_eq!(stored[0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_rate_limited_completion_is_not_retried() {
        let app = TestApp::with_llm(
            ScriptedLlmService::replying("would have worked").then_fail(LlmError::RateLimit),
        );
        let id = app.create_conversation().await;

        let (status, _) = chat(&app, &id, "hello").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(app.llm.requests().len(), 1);
        assert_eq!(app.message_count(&id).await, 1);
    }

    #[tokio::test]
    async fn test_next_turn_after_failure_succeeds() {
        let app = TestApp::with_llm(ScriptedLlmService::replying("back online").then_fail(
            LlmError::Response("malformed".to_string()),
        ));
        let id = app.create_conversation().await;

        chat(&app, &id, "first").await;
        let (status, body) = chat(&app, &id, "second").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "back online");

        let roles: Vec<String> = messages(&app, &id)
            .await
            .iter()
            .map(|m| m["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, vec!["user", "user", "bot"]);
    }
}

mod test_chat_validation {
    use super::*;

    #[tokio::test]
    async fn test_unknown_conversation_returns_404_without_completion() {
        let app = TestApp::replying("unused");

        let (status, body) = chat(&app, &Uuid::new_v4().to_string(), "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(app.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_conversation_id_returns_400() {
        let app = TestApp::replying("unused");

        let (status, body) = chat(&app, "C1", "hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn test_missing_message_returns_400() {
        let app = TestApp::replying("unused");
        let id = app.create_conversation().await;

        let resp = app
            .send(json_request(
                Method::POST,
                "/chat",
                Some(json!({"conversationId": id})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.message_count(&id).await, 0);
    }

    #[tokio::test]
    async fn test_missing_conversation_id_returns_400() {
        let app = TestApp::replying("unused");

        let resp = app
            .send(json_request(
                Method::POST,
                "/chat",
                Some(json!({"message": "hello"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(app.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_message_returns_400() {
        let app = TestApp::replying("unused");
        let id = app.create_conversation().await;

        let (status, body) = chat(&app, &id, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(app.message_count(&id).await, 0);
    }
}

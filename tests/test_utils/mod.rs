//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use bitzzie::api::AppState;
use bitzzie::api::app;
use bitzzie::core::AppConfig;
use bitzzie::openai::{CompletionClient, OpenAiClient};

pub const TEST_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

fn test_config(api_hostname: &str) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "GROQ_API_KEY" => Some(String::from("test-api-key")),
        "BITZZIE_LLM_HOST" => Some(api_hostname.to_string()),
        "BITZZIE_MEMORY_WINDOW" => Some(String::from("2")),
        "BITZZIE_REQUEST_TIMEOUT_SECS" => Some(String::from("5")),
        "BITZZIE_SYSTEM_MESSAGE" => Some(String::from(TEST_SYSTEM_MESSAGE)),
        _ => None,
    })
    .expect("Invalid test config")
}

/// Creates a test application router that sends completions to
/// `api_hostname`, usually a `mockito` server.
pub fn test_app(api_hostname: &str) -> Router {
    let app_config = test_config(api_hostname);
    let client = OpenAiClient::new(
        &app_config.openai_api_hostname,
        &app_config.openai_api_key,
        app_config.request_timeout,
    );
    test_app_with_client(Arc::new(client))
}

/// Creates a test application router backed by `client`
pub fn test_app_with_client(client: Arc<dyn CompletionClient>) -> Router {
    let app_state = AppState::new(test_config("http://127.0.0.1:9"), client);
    app(Arc::new(RwLock::new(app_state)))
}

/// A chat completion response body with `content` as the reply
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "llama3-8b-8192",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

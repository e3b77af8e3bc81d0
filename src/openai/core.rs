use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::{ModelId, ProviderError, ProviderErrorKind};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    Human,
    #[serde(rename = "assistant")]
    Ai,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Boundary to a hosted chat completion provider. Every non-success
/// outcome is terminal for the request; retrying is left to the
/// implementation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &ModelId, messages: &[Message])
    -> Result<String, ProviderError>;
}

/// Client for any OpenAI compatible chat completions API (OpenAI,
/// Groq, llama.cpp, etc).
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_hostname: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        model: &ModelId,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        let resp = completion(
            &self.http,
            messages,
            &self.api_hostname,
            &self.api_key,
            model.as_str(),
            self.timeout,
        )
        .await?;

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ProviderError::new(
                    ProviderErrorKind::InvalidResponse,
                    format!("No message received. Resp: {}", resp),
                )
            })
    }
}

async fn completion(
    http: &reqwest::Client,
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
    timeout: Duration,
) -> Result<Value, ProviderError> {
    let payload = json!({
        "model": model,
        "messages": messages,
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(timeout)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let cause = error_message(&body).unwrap_or_else(|| {
        format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        )
    });
    let kind = match status.as_u16() {
        401 | 403 => ProviderErrorKind::Authentication,
        429 => ProviderErrorKind::RateLimited,
        400 | 404 if cause.to_lowercase().contains("model") => ProviderErrorKind::Model,
        code => ProviderErrorKind::Status(code),
    };
    tracing::warn!("Completion request for model {} failed: {} {}", model, status, cause);

    Err(ProviderError::new(kind, cause))
}

// OpenAI compatible APIs return errors like:
// {"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(String::from)
}

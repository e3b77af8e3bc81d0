use std::env;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Serialize;

use super::error::ChatError;

pub const DEFAULT_LLM_HOST: &str = "https://api.groq.com/openai";
pub const DEFAULT_MODELS: [&str; 2] = ["llama3-8b-8192", "gemma2-9b-it"];
pub const DEFAULT_MEMORY_WINDOW: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are BITZZIE, a helpful, friendly AI assistant. \
You provide clear, concise, and accurate information with a touch of personality. \
You're powered by Groq's fast language models.";

/// A model identifier that is known to be on the allow-list. The only
/// way to get one is through `ModelAllowList::resolve`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of models a session may use. The first entry is the
/// default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelAllowList(Vec<ModelId>);

impl ModelAllowList {
    pub fn new<I, S>(models: I) -> Result<Self, ChatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed: Vec<ModelId> = Vec::new();
        for model in models {
            let model = model.as_ref().trim();
            if model.is_empty() {
                continue;
            }
            if !allowed.iter().any(|m| m.as_str() == model) {
                allowed.push(ModelId(model.to_string()));
            }
        }
        if allowed.is_empty() {
            return Err(ChatError::Configuration(
                "the model allow-list is empty".to_string(),
            ));
        }
        Ok(Self(allowed))
    }

    pub fn resolve(&self, model: &str) -> Result<ModelId, ChatError> {
        let model = model.trim();
        self.0
            .iter()
            .find(|m| m.as_str() == model)
            .cloned()
            .ok_or_else(|| ChatError::Configuration(format!("unknown model '{}'", model)))
    }

    pub fn default_model(&self) -> &ModelId {
        // Never empty, checked in `new`
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelId> {
        self.0.iter()
    }
}

impl Default for ModelAllowList {
    fn default() -> Self {
        Self(DEFAULT_MODELS.iter().map(|m| ModelId(m.to_string())).collect())
    }
}

/// Settings that are fixed for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub system_prompt: String,
    pub models: ModelAllowList,
    pub default_model: ModelId,
    pub memory_window_size: NonZeroUsize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let models = ModelAllowList::default();
        let default_model = models.default_model().clone();
        Self {
            system_prompt: DEFAULT_SYSTEM_MESSAGE.to_string(),
            models,
            default_model,
            memory_window_size: NonZeroUsize::new(DEFAULT_MEMORY_WINDOW)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub request_timeout: Duration,
    /// Upper bound on sessions kept in memory by the web server
    pub max_sessions: NonZeroUsize,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Reads the configuration from the process environment, loading a
    /// `.env` file first if there is one.
    pub fn from_env() -> Result<Self, ChatError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = var("GROQ_API_KEY").ok_or_else(|| {
            ChatError::Configuration("Please set the GROQ_API_KEY environment variable".to_string())
        })?;
        let openai_api_hostname =
            var("BITZZIE_LLM_HOST").unwrap_or_else(|| DEFAULT_LLM_HOST.to_string());

        let models = match var("BITZZIE_MODELS") {
            Some(raw) => ModelAllowList::new(raw.split(','))?,
            None => ModelAllowList::default(),
        };
        let default_model = match var("BITZZIE_DEFAULT_MODEL") {
            Some(model) => models.resolve(&model)?,
            None => models.default_model().clone(),
        };

        let memory_window_size = match var("BITZZIE_MEMORY_WINDOW") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| {
                    ChatError::Configuration(format!(
                        "BITZZIE_MEMORY_WINDOW must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => NonZeroUsize::new(DEFAULT_MEMORY_WINDOW).unwrap_or(NonZeroUsize::MIN),
        };

        let request_timeout_secs = match var("BITZZIE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ChatError::Configuration(format!(
                    "BITZZIE_REQUEST_TIMEOUT_SECS must be an integer, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let max_sessions = match var("BITZZIE_MAX_SESSIONS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| {
                    ChatError::Configuration(format!(
                        "BITZZIE_MAX_SESSIONS must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => NonZeroUsize::new(DEFAULT_MAX_SESSIONS).unwrap_or(NonZeroUsize::MIN),
        };

        let system_prompt =
            var("BITZZIE_SYSTEM_MESSAGE").unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string());

        Ok(Self {
            openai_api_hostname,
            openai_api_key,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_sessions,
            session: SessionConfig {
                system_prompt,
                models,
                default_model,
                memory_window_size,
            },
        })
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use handlebars::Handlebars;

use crate::ai::chat::{Session, SessionBuilder, SessionState};
use crate::api::routes::web::templates;
use crate::core::{AppConfig, ChatError};
use crate::openai::CompletionClient;

struct SessionEntry {
    session: Arc<Session>,
    // Value of `AppState::uses` at the last access
    last_used: u64,
}

pub struct AppState {
    pub config: AppConfig,
    pub client: Arc<dyn CompletionClient>,
    pub templates: Arc<Handlebars<'static>>,
    // One session per browser session ID. Sessions never share a
    // transcript, only the stateless completion client.
    sessions: HashMap<String, SessionEntry>,
    uses: u64,
}

impl AppState {
    pub fn new(config: AppConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            config,
            client,
            templates: Arc::new(templates()),
            sessions: HashMap::new(),
            uses: 0,
        }
    }

    /// Get the session for `id`, starting a new one if needed. When the
    /// registry is full the least recently used idle session is dropped
    /// along with its transcript.
    pub fn session(&mut self, id: &str) -> Result<Arc<Session>, ChatError> {
        validate_session_id(id)?;
        self.uses += 1;

        if let Some(entry) = self.sessions.get_mut(id) {
            entry.last_used = self.uses;
            return Ok(Arc::clone(&entry.session));
        }

        if self.sessions.len() >= self.config.max_sessions.get() {
            self.evict_idle_session();
        }

        tracing::info!("Starting chat session {}", id);
        let session = Arc::new(self.new_session(id));
        self.sessions.insert(
            id.to_string(),
            SessionEntry {
                session: Arc::clone(&session),
                last_used: self.uses,
            },
        );
        Ok(session)
    }

    /// Get the session for `id` without registering a new one. Unknown
    /// IDs get an empty session that is not kept.
    pub fn view_session(&self, id: &str) -> Result<Arc<Session>, ChatError> {
        validate_session_id(id)?;
        Ok(self
            .find_session(id)
            .unwrap_or_else(|| Arc::new(self.new_session(id))))
    }

    pub fn find_session(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(&entry.session))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn new_session(&self, id: &str) -> Session {
        SessionBuilder::new(self.config.session.clone(), Arc::clone(&self.client))
            .id(id)
            .build()
    }

    // Sessions with a cycle in flight are never evicted
    fn evict_idle_session(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .filter(|(_, entry)| entry.session.state() == SessionState::Idle)
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| id.clone());

        match oldest {
            Some(id) => {
                tracing::info!("Dropping least recently used chat session {}", id);
                self.sessions.remove(&id);
            }
            None => tracing::warn!(
                "All {} chat sessions are busy, exceeding the session limit",
                self.sessions.len()
            ),
        }
    }
}

// Session IDs end up in URLs and form fields so keep them to UUID-like
// values.
fn validate_session_id(id: &str) -> Result<(), ChatError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ChatError::Validation(format!("Invalid session ID '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionConfig;
    use crate::openai::OpenAiClient;
    use std::num::NonZeroUsize;
    use std::time::Duration;

    fn state() -> AppState {
        state_with_limit(100)
    }

    fn state_with_limit(max_sessions: usize) -> AppState {
        let config = AppConfig {
            openai_api_hostname: "http://localhost:1".to_string(),
            openai_api_key: "test-key".to_string(),
            request_timeout: Duration::from_secs(1),
            max_sessions: NonZeroUsize::new(max_sessions).unwrap(),
            session: SessionConfig::default(),
        };
        let client = OpenAiClient::new("http://localhost:1", "test-key", Duration::from_secs(1));
        AppState::new(config, Arc::new(client))
    }

    #[test]
    fn test_sessions_are_reused_per_id() {
        let mut state = state();
        let a = state.session("session-a").unwrap();
        let a_again = state.session("session-a").unwrap();
        let b = state.session("session-b").unwrap();

        assert!(Arc::ptr_eq(&a, &a_again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(state.session_count(), 2);
        assert!(state.find_session("session-c").is_none());
    }

    #[test]
    fn test_rejects_invalid_session_ids() {
        let mut state = state();
        let too_long = "x".repeat(65);
        for id in ["", "has space", "a&b=c", too_long.as_str()] {
            assert!(matches!(state.session(id), Err(ChatError::Validation(_))), "{}", id);
        }
        assert_eq!(state.session_count(), 0);
    }

    #[test]
    fn test_session_registry_is_bounded() {
        let mut state = state_with_limit(3);
        for i in 0..50 {
            state.session(&format!("s{}", i)).unwrap();
        }
        assert_eq!(state.session_count(), 3);
        assert!(state.find_session("s0").is_none());
        assert!(state.find_session("s49").is_some());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut state = state_with_limit(2);
        let a = state.session("session-a").unwrap();
        state.session("session-b").unwrap();
        // Touch a so b becomes the oldest
        state.session("session-a").unwrap();
        state.session("session-c").unwrap();

        assert!(Arc::ptr_eq(&a, &state.find_session("session-a").unwrap()));
        assert!(state.find_session("session-b").is_none());
        assert!(state.find_session("session-c").is_some());
    }

    #[test]
    fn test_view_session_does_not_register() {
        let mut state = state();
        let viewed = state.view_session("just-looking").unwrap();
        assert!(viewed.transcript().is_empty());
        assert_eq!(state.session_count(), 0);
        assert!(matches!(
            state.view_session("bad id"),
            Err(ChatError::Validation(_))
        ));

        let stored = state.session("just-looking").unwrap();
        assert!(Arc::ptr_eq(&stored, &state.view_session("just-looking").unwrap()));
    }
}

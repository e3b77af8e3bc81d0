use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use super::models::{SessionState, Transcript, Turn};
use super::window::MemoryWindow;
use crate::ai::prompt::PromptRequest;
use crate::ai::sanitize::sanitize;
use crate::core::{ChatError, ModelId, SessionConfig};
use crate::openai::CompletionClient;

/// Receives the full transcript and an optional error message after
/// every chat cycle so the UI can redraw.
pub trait RenderSink {
    fn render(&mut self, transcript: &Transcript, error: Option<&str>);
}

/// A single user's conversation with an LLM.
///
/// Only one request/response cycle can be in flight at a time. While
/// the session is waiting on the provider any other submission is
/// rejected with `ChatError::Busy` so that a prompt is never built
/// from a window that is about to change.
///
/// Use `SessionBuilder` to construct a valid `Session`.
pub struct Session {
    pub id: String,
    config: SessionConfig,
    client: Arc<dyn CompletionClient>,
    model: RwLock<ModelId>,
    state: Mutex<SessionState>,
    transcript: RwLock<Transcript>,
}

// Returns the session to `Idle` when the cycle ends, including when
// the cycle's future is dropped while waiting on the provider.
struct InFlight<'a> {
    session: &'a Session,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.transition(SessionState::Idle);
    }
}

impl Session {
    /// Runs one request/response cycle for `input` and renders the
    /// result to `sink`. On success the new turn has already been
    /// appended to the transcript.
    pub async fn submit(
        &self,
        input: &str,
        sink: &mut (dyn RenderSink + Send),
    ) -> Result<Turn, ChatError> {
        self.submit_with_model(input, None, sink).await
    }

    /// Like `submit` but switches to `model` for this and later
    /// requests. The switch only happens once the cycle is admitted and
    /// the input is valid, so a rejected submission changes nothing.
    pub async fn submit_with_model(
        &self,
        input: &str,
        model: Option<&str>,
        sink: &mut (dyn RenderSink + Send),
    ) -> Result<Turn, ChatError> {
        let result = self.cycle(input, model).await;

        if let Err(e) = &result {
            tracing::warn!("Chat cycle failed for session {}: {}", self.id, e);
        }
        let error = result.as_ref().err().map(ToString::to_string);
        self.render(sink, error.as_deref());

        result
    }

    /// Renders the current transcript without running a cycle.
    pub fn render(&self, sink: &mut (dyn RenderSink + Send), error: Option<&str>) {
        let transcript = self
            .transcript
            .read()
            .expect("Unable to read session transcript");
        sink.render(&transcript, error);
    }

    async fn cycle(&self, input: &str, model: Option<&str>) -> Result<Turn, ChatError> {
        let _in_flight = self.begin()?;
        let requested = model.map(|m| self.config.models.resolve(m)).transpose()?;

        self.transition(SessionState::BuildingPrompt);
        let request = {
            let transcript = self
                .transcript
                .read()
                .expect("Unable to read session transcript");
            let window = MemoryWindow::build(&transcript, self.config.memory_window_size);
            PromptRequest::new(&self.config.system_prompt, window, input)?
        };

        let model = match requested {
            Some(model) => self.switch_model(model),
            None => self.model(),
        };

        self.transition(SessionState::WaitingOnProvider);
        tracing::debug!(
            "Requesting completion from {} with {} prior turns",
            model,
            request.prior_turns().len()
        );

        match self.client.complete(&model, &request.messages()).await {
            Ok(raw) => {
                self.transition(SessionState::Success);
                let turn = Turn::new(input, &sanitize(&raw));
                self.transcript
                    .write()
                    .expect("Unable to write session transcript")
                    .append(turn.clone());
                Ok(turn)
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                Err(e.into())
            }
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, ChatError> {
        let mut state = self.state.lock().expect("Unable to lock session state");
        if *state != SessionState::Idle {
            return Err(ChatError::Busy);
        }
        *state = SessionState::AwaitingInput;
        tracing::debug!("Session {} state: Idle -> AwaitingInput", self.id);
        Ok(InFlight { session: self })
    }

    fn transition(&self, next: SessionState) {
        let mut state = self.state.lock().expect("Unable to lock session state");
        tracing::debug!("Session {} state: {:?} -> {:?}", self.id, *state, next);
        *state = next;
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("Unable to lock session state")
    }

    pub fn model(&self) -> ModelId {
        self.model.read().expect("Unable to read session model").clone()
    }

    /// Switches the model used for the next request. Only models on the
    /// allow-list are accepted.
    pub fn set_model(&self, model: &str) -> Result<ModelId, ChatError> {
        let model = self.config.models.resolve(model)?;
        Ok(self.switch_model(model))
    }

    fn switch_model(&self, model: ModelId) -> ModelId {
        let mut current = self.model.write().expect("Unable to write session model");
        if *current != model {
            tracing::info!("Session {} switched to model {}", self.id, model);
            *current = model.clone();
        }
        model
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript
            .read()
            .expect("Unable to read session transcript")
            .clone()
    }

    /// Clears the transcript. Not allowed while a cycle is in flight.
    pub fn reset(&self) -> Result<(), ChatError> {
        // Hold the state lock so a cycle can't start while clearing
        let state = self.state.lock().expect("Unable to lock session state");
        if *state != SessionState::Idle {
            return Err(ChatError::Busy);
        }
        self.transcript
            .write()
            .expect("Unable to write session transcript")
            .clear();
        tracing::info!("Session {} reset", self.id);
        Ok(())
    }
}

pub struct SessionBuilder {
    id: Option<String>,
    config: SessionConfig,
    client: Arc<dyn CompletionClient>,
    model: Option<ModelId>,
    transcript: Transcript,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            id: None,
            config,
            client,
            model: None,
            transcript: Transcript::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    pub fn transcript(mut self, turns: Vec<Turn>) -> Self {
        self.transcript = Transcript::new_with_turns(turns);
        self
    }

    pub fn build(self) -> Session {
        let model = self
            .model
            .unwrap_or_else(|| self.config.default_model.clone());
        Session {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            config: self.config,
            client: self.client,
            model: RwLock::new(model),
            state: Mutex::new(SessionState::Idle),
            transcript: RwLock::new(self.transcript),
        }
    }
}

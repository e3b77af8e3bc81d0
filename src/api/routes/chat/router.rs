//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use super::public;
use crate::ai::chat::{RenderSink, Transcript};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

// Keeps the transcript as of the end of the cycle so the response
// reflects exactly what was rendered.
#[derive(Default)]
struct TranscriptSink(Transcript);

impl RenderSink for TranscriptSink {
    fn render(&mut self, transcript: &Transcript, _error: Option<&str>) {
        self.0 = transcript.clone();
    }
}

/// List the models a session can use
async fn chat_models(
    State(state): State<SharedState>,
) -> Result<axum::Json<public::ModelsResponse>, ApiError> {
    let shared_state = state.read().expect("Unable to read share state");
    let session_config = &shared_state.config.session;

    Ok(axum::Json(public::ModelsResponse {
        models: session_config.models.iter().cloned().collect(),
        default_model: session_config.default_model.clone(),
    }))
}

/// Get the transcript of a chat session by ID
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .read()
        .expect("Unable to read share state")
        .find_session(&id);

    let Some(session) = session else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };

    Ok(axum::Json(public::ChatTranscriptResponse {
        session_id: session.id.clone(),
        model: session.model(),
        transcript: session.transcript(),
    })
    .into_response())
}

/// Clear the transcript of a chat session
async fn chat_reset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .read()
        .expect("Unable to read share state")
        .find_session(&id);

    let Some(session) = session else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };
    session.reset()?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Initiate or add to a chat session and wait for the response
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<axum::Json<public::ChatResponse>, ApiError> {
    let session = state
        .write()
        .expect("Unable to write share state")
        .session(&payload.session_id)?;

    let mut sink = TranscriptSink::default();
    let turn = session
        .submit_with_model(&payload.message, payload.model.as_deref(), &mut sink)
        .await?;

    Ok(axum::Json(public::ChatResponse {
        session_id: session.id.clone(),
        model: session.model(),
        turn,
        transcript: sink.0,
    }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/models", get(chat_models))
        .route("/{id}", get(chat_session))
        .route("/{id}/reset", post(chat_reset))
}

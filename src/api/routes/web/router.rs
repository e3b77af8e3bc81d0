//! Router for the chat page

use std::sync::{Arc, RwLock};

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use uuid::Uuid;

use super::page::PageSink;
use super::public;
use crate::ai::chat::Session;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::ChatError;

type SharedState = Arc<RwLock<AppState>>;

fn page_sink(state: &SharedState, session: &Session) -> PageSink {
    let templates = Arc::clone(&state.read().expect("Unable to read share state").templates);
    PageSink::new(templates, &session.id, &session.config().models)
}

fn session(state: &SharedState, id: &str) -> Result<Arc<Session>, ChatError> {
    state
        .write()
        .expect("Unable to write share state")
        .session(id)
}

// Looking at the page never starts a session, only chatting does
fn view_session(state: &SharedState, id: &str) -> Result<Arc<Session>, ChatError> {
    state
        .read()
        .expect("Unable to read share state")
        .view_session(id)
}

/// Show the chat page. New visitors are redirected to a fresh session.
async fn index(
    State(state): State<SharedState>,
    Query(params): Query<public::PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(session_id) = params.session_id.filter(|id| !id.is_empty()) else {
        let url = format!("/?session_id={}", Uuid::new_v4());
        return Ok(Redirect::to(&url).into_response());
    };

    let session = view_session(&state, &session_id)?;
    let mut sink = page_sink(&state, &session);
    session.render(&mut sink, None);

    Ok(Html(sink.into_html(&session.model())?).into_response())
}

/// Submit the chat form. Chat errors are shown on the page rather
/// than returned as an error response so the conversation stays
/// visible.
async fn chat(
    State(state): State<SharedState>,
    Form(form): Form<public::ChatForm>,
) -> Result<Html<String>, ApiError> {
    let session = session(&state, &form.session_id)?;

    let mut sink = page_sink(&state, &session);
    // The outcome is already rendered into the page
    let _ = session
        .submit_with_model(&form.message, form.model.as_deref(), &mut sink)
        .await;

    Ok(Html(sink.into_html(&session.model())?))
}

/// Start a new conversation in the same session
async fn reset(
    State(state): State<SharedState>,
    Form(form): Form<public::ResetForm>,
) -> Result<impl IntoResponse, ApiError> {
    let session = view_session(&state, &form.session_id)?;

    if let Err(e) = session.reset() {
        let mut sink = page_sink(&state, &session);
        session.render(&mut sink, Some(&e.to_string()));
        return Ok(Html(sink.into_html(&session.model())?).into_response());
    }

    let url = format!("/?session_id={}", session.id);
    Ok(Redirect::to(&url).into_response())
}

/// Create the chat page router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
}

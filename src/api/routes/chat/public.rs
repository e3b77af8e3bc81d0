//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::{Transcript, Turn};
use crate::core::ModelId;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    // Switches the session's model before sending when set
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub model: ModelId,
    pub turn: Turn,
    pub transcript: Transcript,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub session_id: String,
    pub model: ModelId,
    pub transcript: Transcript,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelId>,
    pub default_model: ModelId,
}

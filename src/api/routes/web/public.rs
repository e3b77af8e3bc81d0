//! Public types for the chat page
use serde::{Deserialize, Serialize};

use crate::ai::chat::Turn;

#[derive(Deserialize)]
pub struct PageQuery {
    pub session_id: Option<String>,
}

/// Form submitted by the chat page
#[derive(Deserialize)]
pub struct ChatForm {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
    pub model: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetForm {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ModelOption {
    pub id: String,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub greeting: &'a str,
    pub session_id: &'a str,
    pub models: &'a [ModelOption],
    pub turns: &'a [Turn],
    pub error: Option<&'a str>,
}

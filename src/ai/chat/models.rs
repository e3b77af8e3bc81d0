//! The core models for managing a stateful chat with an LLM.
use serde::{Deserialize, Serialize};

/// One human message paired with the AI's reply to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    human_text: String,
    ai_text: String,
}

impl Turn {
    pub fn new(human_text: &str, ai_text: &str) -> Self {
        Self {
            human_text: human_text.to_string(),
            ai_text: ai_text.to_string(),
        }
    }

    pub fn human_text(&self) -> &str {
        &self.human_text
    }

    pub fn ai_text(&self) -> &str {
        &self.ai_text
    }
}

/// Append-only history of turns in chronological order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_turns(turns: Vec<Turn>) -> Self {
        Self(turns)
    }

    pub fn append(&mut self, turn: Turn) {
        self.0.push(turn)
    }

    pub fn all(&self) -> &[Turn] {
        &self.0
    }

    /// The last `n` turns in order, or all of them if there are fewer.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    // Only used when a session is explicitly reset
    pub(crate) fn clear(&mut self) {
        self.0.clear()
    }
}

/// Where a session is in its request/response cycle. Anything other
/// than `Idle` means a cycle is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingInput,
    BuildingPrompt,
    WaitingOnProvider,
    Success,
    Failed,
}

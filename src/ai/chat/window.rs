use std::num::NonZeroUsize;

use super::models::{Transcript, Turn};

/// The prior turns sent along with the next request: the most recent
/// `size` turns of the transcript, oldest first. Older turns are dropped
/// without any summarization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryWindow(Vec<Turn>);

impl MemoryWindow {
    pub fn build(transcript: &Transcript, size: NonZeroUsize) -> Self {
        Self(transcript.recent(size.get()).to_vec())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Turn>> for MemoryWindow {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}

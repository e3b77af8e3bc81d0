//! Assembles the message list sent to the completion provider.

use crate::ai::chat::MemoryWindow;
use crate::core::ChatError;
use crate::openai::{Message, Role};

/// Everything needed for a single completion request. Built per call
/// and never stored.
#[derive(Clone, Debug)]
pub struct PromptRequest {
    system_prompt: String,
    prior_turns: MemoryWindow,
    new_human_text: String,
}

impl PromptRequest {
    /// Fails with `ChatError::Validation` if there is nothing to send.
    pub fn new(
        system_prompt: &str,
        prior_turns: MemoryWindow,
        new_human_text: &str,
    ) -> Result<Self, ChatError> {
        if new_human_text.trim().is_empty() {
            return Err(ChatError::Validation(
                "Please enter a message before sending.".to_string(),
            ));
        }

        Ok(Self {
            system_prompt: system_prompt.to_string(),
            prior_turns,
            new_human_text: new_human_text.to_string(),
        })
    }

    pub fn prior_turns(&self) -> &MemoryWindow {
        &self.prior_turns
    }

    /// System message first, then each prior turn as a human/AI pair,
    /// then the new human message.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2 * self.prior_turns.len() + 2);
        messages.push(Message::new(Role::System, &self.system_prompt));
        for turn in self.prior_turns.turns() {
            messages.push(Message::new(Role::Human, turn.human_text()));
            messages.push(Message::new(Role::Ai, turn.ai_text()));
        }
        messages.push(Message::new(Role::Human, &self.new_human_text));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::chat::Turn;

    #[test]
    fn test_messages_order() {
        let window = MemoryWindow::from(vec![Turn::new("A", "a"), Turn::new("B", "b")]);
        let request = PromptRequest::new("Be nice.", window, "C").unwrap();

        assert_eq!(
            request.messages(),
            vec![
                Message::new(Role::System, "Be nice."),
                Message::new(Role::Human, "A"),
                Message::new(Role::Ai, "a"),
                Message::new(Role::Human, "B"),
                Message::new(Role::Ai, "b"),
                Message::new(Role::Human, "C"),
            ]
        );
    }

    #[test]
    fn test_message_count() {
        for n in 0..5 {
            let turns: Vec<Turn> = (0..n).map(|i| Turn::new(&i.to_string(), "ok")).collect();
            let request = PromptRequest::new("sys", MemoryWindow::from(turns), "next").unwrap();
            assert_eq!(request.messages().len(), 2 * n + 2);
        }
    }

    #[test]
    fn test_rejects_blank_input() {
        for input in ["", " ", "\n\t  "] {
            let result = PromptRequest::new("sys", MemoryWindow::default(), input);
            assert!(matches!(result, Err(ChatError::Validation(_))), "{:?}", input);
        }
    }

    #[test]
    fn test_keeps_input_as_entered() {
        let request = PromptRequest::new("sys", MemoryWindow::default(), "  hi  ").unwrap();
        assert_eq!(request.messages()[1].content, "  hi  ");
    }
}

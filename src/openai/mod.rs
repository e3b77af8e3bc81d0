mod core;

pub use self::core::{CompletionClient, Message, OpenAiClient, Role};

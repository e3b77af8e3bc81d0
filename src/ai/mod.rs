pub mod chat;
pub mod prompt;
pub mod sanitize;

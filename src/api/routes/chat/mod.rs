//! Chat API: submit messages to a session and inspect its transcript

pub mod public;
mod router;

pub use router::router;

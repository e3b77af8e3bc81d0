mod core;
mod models;
mod window;

pub use self::core::{RenderSink, Session, SessionBuilder};
pub use models::{SessionState, Transcript, Turn};
pub use window::MemoryWindow;

//! Server rendered chat page

mod page;
pub mod public;
mod router;

pub use page::{GREETING, PageSink, TITLE, templates};
pub use router::router;

mod config;
mod error;

pub use config::{AppConfig, ModelAllowList, ModelId, SessionConfig};
pub use config::{DEFAULT_LLM_HOST, DEFAULT_MEMORY_WINDOW, DEFAULT_SYSTEM_MESSAGE};
pub use error::{ChatError, ProviderError, ProviderErrorKind};

//! Error taxonomy for a chat session.
//!
//! `Validation` and `Busy` are recovered locally by the session, a
//! `Provider` failure is reported to the user and leaves the session
//! usable, and `Configuration` is fatal at startup (or rejects a single
//! request when a client asks for a model that isn't allowed).
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("a response is already in progress for this session")]
    Busy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Network,
    Timeout,
    Authentication,
    RateLimited,
    Model,
    Status(u16),
    InvalidResponse,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Authentication => write!(f, "authentication failed"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Model => write!(f, "model rejected"),
            Self::Status(code) => write!(f, "unexpected status {}", code),
            Self::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// A failed call to the completion provider. `cause` is meant to be
/// shown to the user as is.
#[derive(Clone, Debug, Error)]
#[error("completion provider error ({kind}): {cause}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub cause: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_decode() {
            ProviderErrorKind::InvalidResponse
        } else {
            ProviderErrorKind::Network
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_message_includes_cause() {
        let err = ChatError::from(ProviderError::new(
            ProviderErrorKind::RateLimited,
            "Too many requests",
        ));
        assert_eq!(
            err.to_string(),
            "completion provider error (rate limited): Too many requests"
        );
    }

    #[test]
    fn test_validation_error_message_is_user_facing() {
        let err = ChatError::Validation("Please enter a message".to_string());
        assert_eq!(err.to_string(), "Please enter a message");
    }
}

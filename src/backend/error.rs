//! Error types for remote calls

use thiserror::Error;

/// Failure talking to the data store or the user-record endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },
    /// A record with the same id already exists
    #[error("record already exists")]
    Duplicate,
    /// The response body could not be understood
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PersistenceError::Decode(err.to_string())
        } else {
            PersistenceError::Transport(err.to_string())
        }
    }
}

/// Failure reported by the identity provider, shown to the user verbatim
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::new(format!("Could not reach the sign-in service: {err}"))
    }
}

//! Client session error type.

use thiserror::Error;

/// Errors surfaced by the session manager and the typed API helpers.
///
/// `Clone` so a single refresh outcome can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection, DNS, TLS, body).
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// Refresh failed; both credentials were discarded.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// No credentials are held.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Persisting or loading the session failed.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// A response or credential could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl SessionError {
    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

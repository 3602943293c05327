//! Observable session state and notifications.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No credentials held.
    Anonymous,
    /// Credentials held, no refresh in flight.
    Authenticated,
    /// A refresh is in flight; requests wait for its outcome.
    Refreshing,
}

/// Transient notifications emitted on session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { username: Option<String> },
    Refreshed,
    /// Refresh failed; the session was torn down.
    Expired,
    SignedOut,
}

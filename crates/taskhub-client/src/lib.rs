//! # taskhub-client
//!
//! Client-side session handling for the TaskHub API.
//!
//! [`SessionManager`] holds the access and rotation credentials, persists
//! them through a [`SessionStorage`], attaches the access credential to
//! outgoing requests, and transparently performs at most one refresh per
//! session at a time before replaying a rejected request once.

pub mod claims;
pub mod error;
pub mod manager;
pub mod state;
pub mod storage;
pub mod tasks;

pub use claims::UnverifiedClaims;
pub use error::SessionError;
pub use manager::SessionManager;
pub use state::{SessionEvent, SessionStatus};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
pub use tasks::TasksApi;

//! # taskhub-database
//!
//! PostgreSQL connection management, the repository interfaces used by the
//! auth and task layers, and their sqlx-backed and in-memory implementations.

pub mod repositories;
pub mod store;

pub use repositories::{TaskRepository, UserRepository};
pub use store::PgStore;

//! Repository interfaces and their implementations.
//!
//! Handlers and services depend on the [`UserRepository`] and
//! [`TaskRepository`] traits only; the composition root picks either the
//! PostgreSQL or the in-memory implementation.

pub mod memory;
pub mod task;
pub mod user;

use async_trait::async_trait;

use taskhub_core::result::AppResult;
use taskhub_entity::task::{NewTask, Task, TaskPatch};
use taskhub_entity::user::{NewUser, User};

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use task::PgTaskRepository;
pub use user::PgUserRepository;

/// Persistence operations on user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with `Conflict` if the username is taken.
    async fn insert(&self, user: &NewUser) -> AppResult<User>;

    /// Check backing store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Persistence operations on tasks, always scoped to an owner.
#[async_trait]
pub trait TaskRepository: Send + Sync + std::fmt::Debug + 'static {
    async fn list(&self, owner_id: i64) -> AppResult<Vec<Task>>;

    async fn find(&self, owner_id: i64, id: i64) -> AppResult<Option<Task>>;

    async fn insert(&self, owner_id: i64, task: &NewTask) -> AppResult<Task>;

    /// Apply a partial update. Returns `None` when no owned task has that id.
    async fn patch(&self, owner_id: i64, id: i64, patch: &TaskPatch) -> AppResult<Option<Task>>;

    /// Delete a task. Returns `false` when no owned task has that id.
    async fn delete(&self, owner_id: i64, id: i64) -> AppResult<bool>;
}

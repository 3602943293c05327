//! In-process repositories backed by `DashMap`.
//!
//! Used by the test suites and by the `database.url = "memory"` development
//! mode. Data is lost when the process exits.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::task::{NewTask, Task, TaskPatch};
use taskhub_entity::user::{NewUser, User};

use super::{TaskRepository, UserRepository};

/// In-memory [`UserRepository`]. Usernames are unique via the map key.
#[derive(Debug)]
pub struct MemoryUserRepository {
    by_username: DashMap<String, User>,
    next_id: AtomicI64,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            by_username: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }

    /// Remove a user by id, returning whether one existed.
    pub fn remove(&self, id: i64) -> bool {
        let username = self
            .by_username
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.key().clone());
        match username {
            Some(name) => self.by_username.remove(&name).is_some(),
            None => false,
        }
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.by_username.get(username).map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self
            .by_username
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("User already exists")),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let created = User {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    username: user.username.clone(),
                    password_hash: user.password_hash.clone(),
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// In-memory [`TaskRepository`] keyed by task id.
#[derive(Debug)]
pub struct MemoryTaskRepository {
    tasks: DashMap<i64, Task>,
    next_id: AtomicI64,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for MemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn list(&self, owner_id: i64) -> AppResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().user_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    async fn find(&self, owner_id: i64, id: i64) -> AppResult<Option<Task>> {
        Ok(self
            .tasks
            .get(&id)
            .filter(|t| t.user_id == owner_id)
            .map(|t| t.value().clone()))
    }

    async fn insert(&self, owner_id: i64, task: &NewTask) -> AppResult<Task> {
        let created = Task {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            user_id: owner_id,
        };
        self.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn patch(&self, owner_id: i64, id: i64, patch: &TaskPatch) -> AppResult<Option<Task>> {
        match self.tasks.get_mut(&id) {
            Some(mut task) if task.user_id == owner_id => {
                patch.apply(&mut task);
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner_id: i64, id: i64) -> AppResult<bool> {
        Ok(self
            .tasks
            .remove_if(&id, |_, task| task.user_id == owner_id)
            .is_some())
    }
}

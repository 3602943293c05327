//! Typed helpers for the owner-scoped task endpoints.

use reqwest::Method;

use taskhub_entity::task::{NewTask, Task, TaskPatch};

use crate::error::SessionError;
use crate::manager::SessionManager;

/// Task endpoints, called through a [`SessionManager`].
#[derive(Debug, Clone, Copy)]
pub struct TasksApi<'a> {
    session: &'a SessionManager,
}

impl<'a> TasksApi<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> Result<Vec<Task>, SessionError> {
        self.session
            .request_json(Method::GET, "/api/tasks", None)
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Task, SessionError> {
        self.session
            .request_json(Method::GET, &format!("/api/tasks/{id}"), None)
            .await
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task, SessionError> {
        let body = serde_json::to_value(task)?;
        self.session
            .request_json(Method::POST, "/api/tasks", Some(&body))
            .await
    }

    pub async fn update(&self, id: i64, patch: &TaskPatch) -> Result<Task, SessionError> {
        let body = serde_json::to_value(patch)?;
        self.session
            .request_json(Method::PUT, &format!("/api/tasks/{id}"), Some(&body))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), SessionError> {
        self.session
            .request_empty(Method::DELETE, &format!("/api/tasks/{id}"), None)
            .await
    }
}

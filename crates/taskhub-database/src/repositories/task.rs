//! PostgreSQL task repository.

use async_trait::async_trait;
use sqlx::PgPool;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::task::{NewTask, Task, TaskPatch};

use super::TaskRepository;

/// sqlx-backed [`TaskRepository`].
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, owner_id: i64) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE user_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("Failed to list tasks", e))
    }

    async fn find(&self, owner_id: i64, id: i64) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("Failed to find task", e))
    }

    async fn insert(&self, owner_id: i64, task: &NewTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, status, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database("Failed to create task", e))
    }

    async fn patch(&self, owner_id: i64, id: i64, patch: &TaskPatch) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = COALESCE($3, title), \
                              description = COALESCE($4, description), \
                              status = COALESCE($5, status) \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database("Failed to update task", e))
    }

    async fn delete(&self, owner_id: i64, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database("Failed to delete task", e))?;

        Ok(result.rows_affected() > 0)
    }
}

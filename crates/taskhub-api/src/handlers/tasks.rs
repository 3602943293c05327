//! Task handlers. Every query is scoped to the caller's user id.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use taskhub_core::error::AppError;
use taskhub_core::types::ApiResponse;
use taskhub_entity::task::{Task, TaskPatch};

use crate::dto::request::{CreateTaskRequest, validate_patch};
use crate::extractors::{ApiJson, AuthUser};
use crate::state::AppState;

fn task_not_found() -> AppError {
    AppError::not_found("Task not found")
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Task>>>, AppError> {
    let tasks = state.tasks.list(auth.user_id()).await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let task = state
        .tasks
        .find(auth.user_id(), id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let new_task = req.into_new_task()?;
    let task = state.tasks.insert(auth.user_id(), &new_task).await?;
    info!(user_id = auth.user_id(), task_id = task.id, "Task created");
    Ok(Json(ApiResponse::ok(task)))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    validate_patch(&patch)?;
    let task = state
        .tasks
        .patch(auth.user_id(), id, &patch)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(Json(ApiResponse::ok(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !state.tasks.delete(auth.user_id(), id).await? {
        return Err(task_not_found());
    }
    info!(user_id = auth.user_id(), task_id = id, "Task deleted");
    Ok(Json(ApiResponse::empty()))
}

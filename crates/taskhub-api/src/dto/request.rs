//! Request DTOs.
//!
//! Auth fields are optional at the serde level so that a missing field is
//! reported with the same message as an empty one.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use taskhub_core::error::AppError;
use taskhub_entity::task::{NewTask, TaskPatch, TaskStatus};

/// Body of sign-up and sign-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

/// Body of sign-out and refresh-token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.as_deref().unwrap_or_default()
    }
}

/// Body of task creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl CreateTaskRequest {
    /// Check required fields and bounds, producing the entity to insert.
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::validation("Title is required"))?;

        let task = NewTask {
            title,
            description: self.description,
            status: self.status.unwrap_or_default(),
        };
        task.validate().map_err(validation_error)?;
        Ok(task)
    }
}

/// Validate a partial task update.
pub fn validate_patch(patch: &TaskPatch) -> Result<(), AppError> {
    patch.validate().map_err(validation_error)
}

/// Convert validator output into a single `Validation` error.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());
    AppError::validation(message)
}

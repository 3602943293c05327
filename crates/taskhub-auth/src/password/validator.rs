//! Presence and length rules for submitted credentials.

use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;

/// Length bounds applied to usernames and passwords at registration.
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    username_min: usize,
    username_max: usize,
    password_min: usize,
    password_max: usize,
}

impl CredentialPolicy {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username_min: config.username_min_length,
            username_max: config.username_max_length,
            password_min: config.password_min_length,
            password_max: config.password_max_length,
        }
    }

    /// Both fields must be present and non-empty.
    pub fn require_present(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation(
                "Username and password are required",
            ));
        }
        Ok(())
    }

    /// Full registration check: presence, then lower bounds, then upper bounds.
    pub fn validate_registration(&self, username: &str, password: &str) -> Result<(), AppError> {
        self.require_present(username, password)?;

        let username_len = username.chars().count();
        let password_len = password.chars().count();

        if username_len < self.username_min || password_len < self.password_min {
            let min = if username_len < self.username_min {
                self.username_min
            } else {
                self.password_min
            };
            return Err(AppError::validation(format!(
                "Username and password must be at least {min} characters long"
            )));
        }

        if username_len > self.username_max || password_len > self.password_max {
            let max = if username_len > self.username_max {
                self.username_max
            } else {
                self.password_max
            };
            return Err(AppError::validation(format!(
                "Username and password must be less than {max} characters long"
            )));
        }

        Ok(())
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

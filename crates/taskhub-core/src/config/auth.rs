//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential issuance and validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access credential signing (HMAC-SHA256). Has no default.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access credential lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Rotation credential lifetime in days.
    #[serde(default = "default_rotation_ttl")]
    pub rotation_ttl_days: u64,
    /// Scheme prefixed to issued access credentials.
    #[serde(default = "default_token_scheme")]
    pub token_scheme: String,
    #[serde(default = "default_min_length")]
    pub username_min_length: usize,
    #[serde(default = "default_max_length")]
    pub username_max_length: usize,
    #[serde(default = "default_min_length")]
    pub password_min_length: usize,
    #[serde(default = "default_max_length")]
    pub password_max_length: usize,
}

impl AuthConfig {
    /// Rotation credential lifetime in seconds.
    pub fn rotation_ttl_seconds(&self) -> u64 {
        self.rotation_ttl_days * 24 * 60 * 60
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            rotation_ttl_days: default_rotation_ttl(),
            token_scheme: default_token_scheme(),
            username_min_length: default_min_length(),
            username_max_length: default_max_length(),
            password_min_length: default_min_length(),
            password_max_length: default_max_length(),
        }
    }
}

fn default_access_ttl() -> u64 {
    60
}

fn default_rotation_ttl() -> u64 {
    12
}

fn default_token_scheme() -> String {
    "Bearer".to_string()
}

fn default_min_length() -> usize {
    4
}

fn default_max_length() -> usize {
    128
}

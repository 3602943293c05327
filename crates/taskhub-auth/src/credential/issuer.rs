//! Issuance of rotation and access credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::user::User;

use super::store::CredentialStore;
use crate::jwt::JwtEncoder;

/// Access + rotation credential pair returned by register and sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// `"<scheme> <signed-token>"`.
    pub access_token: String,
    /// Opaque rotation credential.
    pub refresh_token: String,
}

/// Mints rotation credentials (persisted) and access credentials (stateless).
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    store: CredentialStore,
    encoder: JwtEncoder,
    rotation_ttl: Duration,
    scheme: String,
}

impl CredentialIssuer {
    pub fn new(store: CredentialStore, encoder: JwtEncoder, config: &AuthConfig) -> Self {
        Self {
            store,
            encoder,
            rotation_ttl: Duration::from_secs(config.rotation_ttl_seconds()),
            scheme: config.token_scheme.clone(),
        }
    }

    /// Generate a random rotation credential and persist it for `user_id`.
    pub async fn issue_rotation_credential(&self, user_id: i64) -> AppResult<String> {
        let token = Uuid::new_v4().to_string();
        self.store.put(&token, user_id, self.rotation_ttl).await?;
        debug!(user_id, "Rotation credential issued");
        Ok(token)
    }

    /// Sign an access credential for `user`, provided `rotation_token` is
    /// still live in the store and belongs to that user.
    pub async fn issue_access_credential(
        &self,
        rotation_token: &str,
        user: &User,
    ) -> AppResult<String> {
        match self.store.get(rotation_token).await? {
            Some(owner) if owner == user.id => {}
            _ => return Err(AppError::invalid_rotation_credential("Invalid refresh token")),
        }

        let (token, _) = self.encoder.encode(user.id, &user.username)?;
        Ok(format!("{} {token}", self.scheme))
    }

    /// Issue a fresh rotation credential and an access credential bound to it.
    pub async fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        let refresh_token = self.issue_rotation_credential(user.id).await?;
        let access_token = self.issue_access_credential(&refresh_token, user).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

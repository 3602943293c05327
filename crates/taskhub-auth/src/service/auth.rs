//! Register, sign-in, sign-out, and refresh orchestration.

use std::sync::Arc;

use tracing::{info, warn};

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::repositories::UserRepository;
use taskhub_entity::user::NewUser;

use crate::credential::{CredentialIssuer, CredentialStore, TokenPair};
use crate::password::{CredentialPolicy, PasswordHasher};

/// Coordinates password checks, user persistence, and credential issuance.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    issuer: Arc<CredentialIssuer>,
    store: CredentialStore,
    hasher: PasswordHasher,
    policy: CredentialPolicy,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        issuer: Arc<CredentialIssuer>,
        store: CredentialStore,
        hasher: PasswordHasher,
        policy: CredentialPolicy,
    ) -> Self {
        Self {
            users,
            issuer,
            store,
            hasher,
            policy,
        }
    }

    /// Create an account and open its first session.
    ///
    /// 1. Validate presence and length bounds
    /// 2. Reject taken usernames
    /// 3. Hash and persist
    /// 4. Issue a rotation + access credential pair
    pub async fn register(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        self.policy.validate_registration(username, password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .users
            .insert(&NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        let tokens = self.issuer.issue_pair(&user).await?;
        info!(user_id = user.id, "User registered");
        Ok(tokens)
    }

    /// Verify a password and open a new, independent session.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        self.policy.require_present(username, password)?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Sign-in rejected: wrong password");
            return Err(AppError::invalid_credentials("Invalid password"));
        }

        let tokens = self.issuer.issue_pair(&user).await?;
        info!(user_id = user.id, "User signed in");
        Ok(tokens)
    }

    /// Revoke a rotation credential. Unknown credentials are accepted.
    ///
    /// Access credentials already minted from it stay valid until they expire.
    pub async fn sign_out(&self, rotation_token: &str) -> AppResult<()> {
        if rotation_token.is_empty() {
            return Err(AppError::validation("Refresh token is required"));
        }

        self.store.delete(rotation_token).await?;
        info!("Rotation credential revoked");
        Ok(())
    }

    /// Exchange a live rotation credential for a new access credential.
    ///
    /// The rotation credential itself is left in place and stays usable.
    pub async fn refresh(&self, rotation_token: &str) -> AppResult<String> {
        if rotation_token.is_empty() {
            return Err(AppError::validation("Refresh token is required"));
        }

        let user_id = self
            .store
            .get(rotation_token)
            .await?
            .ok_or_else(|| AppError::invalid_rotation_credential("Invalid refresh token"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let access_token = self
            .issuer
            .issue_access_credential(rotation_token, &user)
            .await?;

        info!(user_id = user.id, "Access credential refreshed");
        Ok(access_token)
    }
}

//! Rotation credential → user id associations with automatic expiry.

use std::time::Duration;

use tracing::warn;

use taskhub_cache::keys;
use taskhub_cache::provider::CacheManager;
use taskhub_core::result::AppResult;
use taskhub_core::traits::cache::CacheProvider;

/// Key-value view over the cache backend for rotation credentials.
///
/// The backend is the single source of truth for credential validity; no
/// lookups are cached locally.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cache: CacheManager,
}

impl CredentialStore {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Associate `token` with `user_id`, replacing any previous entry.
    pub async fn put(&self, token: &str, user_id: i64, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&keys::rotation_credential(token), &user_id.to_string(), ttl)
            .await
    }

    /// Look up the user id for `token`. Absent or expired tokens yield `None`.
    pub async fn get(&self, token: &str) -> AppResult<Option<i64>> {
        let Some(raw) = self.cache.get(&keys::rotation_credential(token)).await? else {
            return Ok(None);
        };

        match raw.parse::<i64>() {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                warn!("Ignoring rotation credential with a non-numeric user id");
                Ok(None)
            }
        }
    }

    /// Remove `token`. Removing an absent token is not an error.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&keys::rotation_credential(token)).await
    }

    pub async fn health_check(&self) -> AppResult<bool> {
        self.cache.health_check().await
    }
}

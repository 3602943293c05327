//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Redis-backed cache provider. Expiry is delegated to Redis (`SET ... EX`).
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

/// `SET ... EX 0` is rejected by Redis, so sub-second TTLs round up.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.client
            .connection()
            .get(self.client.key(key))
            .await
            .map_err(|e| AppError::cache("Redis GET failed", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let seconds = expiry_seconds(ttl);
        let _: () = self
            .client
            .connection()
            .set_ex(self.client.key(key), value, seconds)
            .await
            .map_err(|e| AppError::cache("Redis SET failed", e))?;
        debug!(ttl_seconds = seconds, "Stored key with expiry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let _: () = self
            .client
            .connection()
            .del(self.client.key(key))
            .await
            .map_err(|e| AppError::cache("Redis DEL failed", e))?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let pong: String = redis::cmd("PING")
            .query_async(&mut self.client.connection())
            .await
            .map_err(|e| AppError::cache("Redis PING failed", e))?;
        Ok(pong == "PONG")
    }
}

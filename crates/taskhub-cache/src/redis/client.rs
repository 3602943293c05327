//! Connection to a Redis credential store.

use std::fmt;

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use taskhub_core::config::RedactedUrl;
use taskhub_core::config::cache::RedisCacheConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

/// Auto-reconnecting Redis connection scoped to a key namespace.
///
/// Clones share one multiplexed socket.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    namespace: String,
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Open the connection. Fails fast if the server is unreachable.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let url = RedactedUrl(&config.url);

        let client = Client::open(config.url.as_str())
            .map_err(|e| AppError::cache(format!("Invalid Redis URL {url}"), e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::cache(format!("Redis at {url} is unreachable"), e))?;

        info!(%url, namespace = %config.key_prefix, "Credential store connected");
        Ok(Self {
            conn,
            namespace: config.key_prefix.clone(),
        })
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Physical key for a logical credential-store key.
    pub fn key(&self, key: &str) -> String {
        namespaced(&self.namespace, key)
    }
}

fn namespaced(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{namespace}:{key}")
    }
}

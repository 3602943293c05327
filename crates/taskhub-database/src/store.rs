//! PostgreSQL store: pool lifecycle, embedded schema, repository handles.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use taskhub_core::config::RedactedUrl;
use taskhub_core::config::database::DatabaseConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

use crate::repositories::{PgTaskRepository, PgUserRepository};

/// `users` and `tasks` tables, applied in version order on startup.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Pooled connection to the database holding users and tasks.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and bring the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %RedactedUrl(&config.url),
            max_connections = config.max_connections,
            "Opening PostgreSQL store"
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::database("Failed to connect to PostgreSQL", e))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database("Failed to apply schema migrations", e))?;
        info!(migrations = MIGRATOR.iter().count(), "Schema is up to date");
        Ok(())
    }

    pub fn users(&self) -> PgUserRepository {
        PgUserRepository::new(self.pool.clone())
    }

    pub fn tasks(&self) -> PgTaskRepository {
        PgTaskRepository::new(self.pool.clone())
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL store closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        // sqlx rejects a floor above the ceiling at connect time.
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

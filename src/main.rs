//! TaskHub Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use taskhub_api::app::build_app;
use taskhub_api::state::AppState;
use taskhub_cache::provider::CacheManager;
use taskhub_core::config::AppConfig;
use taskhub_core::config::database::DatabaseConfig;
use taskhub_core::error::AppError;
use taskhub_database::PgStore;
use taskhub_database::repositories::{
    MemoryTaskRepository, MemoryUserRepository, TaskRepository, UserRepository,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `TASKHUB_ENV` overlay, and `TASKHUB__*`
/// environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TASKHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Repositories ─────────────────────────────────────
    let (users, tasks, pg_store) = init_repositories(&config.database).await?;

    // ── Step 2: Credential store ─────────────────────────────────
    tracing::info!(
        "Initializing credential store (provider: {})...",
        config.cache.provider
    );
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Application state + router ───────────────────────
    let addr = config.server.bind_address();
    let state = AppState::new(config, cache, users, tasks);
    let app = build_app(state);

    // ── Step 4: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("TaskHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Cleanup ──────────────────────────────────────────
    if let Some(pg_store) = pg_store {
        pg_store.close().await;
    }
    tracing::info!("TaskHub server shut down gracefully");
    Ok(())
}

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn TaskRepository>,
    Option<PgStore>,
);

/// In-memory repositories for `url = "memory"`, PostgreSQL otherwise.
async fn init_repositories(config: &DatabaseConfig) -> Result<Repositories, AppError> {
    if config.is_memory() {
        tracing::warn!("Using in-memory repositories; data is lost on restart");
        let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
        let tasks: Arc<dyn TaskRepository> = Arc::new(MemoryTaskRepository::new());
        return Ok((users, tasks, None));
    }

    let store = PgStore::open(config).await?;
    let users: Arc<dyn UserRepository> = Arc::new(store.users());
    let tasks: Arc<dyn TaskRepository> = Arc::new(store.tasks());
    Ok((users, tasks, Some(store)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

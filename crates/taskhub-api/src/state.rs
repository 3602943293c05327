//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use taskhub_auth::credential::{CredentialIssuer, CredentialStore};
use taskhub_auth::jwt::{JwtDecoder, JwtEncoder};
use taskhub_auth::password::{CredentialPolicy, PasswordHasher};
use taskhub_auth::service::AuthService;
use taskhub_cache::provider::CacheManager;
use taskhub_core::config::AppConfig;
use taskhub_database::repositories::{TaskRepository, UserRepository};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheaply cloneable.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Register / sign-in / sign-out / refresh flows
    pub auth: Arc<AuthService>,
    /// Access credential verifier
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Rotation credential store
    pub credentials: CredentialStore,

    // ── Repositories ─────────────────────────────────────────
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl AppState {
    /// Wire the auth stack over the given backends.
    pub fn new(
        config: AppConfig,
        cache: CacheManager,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        let credentials = CredentialStore::new(cache);
        let issuer = Arc::new(CredentialIssuer::new(
            credentials.clone(),
            JwtEncoder::new(&config.auth),
            &config.auth,
        ));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&users),
            issuer,
            credentials.clone(),
            PasswordHasher::new(),
            CredentialPolicy::new(&config.auth),
        ));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        Self {
            config: Arc::new(config),
            auth,
            jwt_decoder,
            credentials,
            users,
            tasks,
        }
    }
}

//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::Request as AxumRequest;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use async_trait::async_trait;
use serde_json::Value;
use tower::ServiceExt;

use taskhub_api::app::build_app;
use taskhub_api::state::AppState;
use taskhub_auth::credential::CredentialStore;
use taskhub_auth::jwt::Claims;
use taskhub_cache::provider::CacheManager;
use taskhub_core::config::AppConfig;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_core::traits::cache::CacheProvider;
use taskhub_database::repositories::{MemoryTaskRepository, MemoryUserRepository, UserRepository};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Sign an access credential for `id` expiring `exp_offset` seconds from now.
pub fn forge_access_token(secret: &str, id: i64, username: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id,
        username: username.to_string(),
        iat: now.min(now + exp_offset),
        exp: now + exp_offset,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token");
    format!("Bearer {token}")
}

/// In-memory configuration with a fixed signing secret.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.database.url = "memory".to_string();
    config.cache.provider = "memory".to_string();
    config
}

/// Key-value store that can be taken offline mid-test.
#[derive(Debug)]
pub struct SwitchableCache {
    inner: CacheManager,
    offline: AtomicBool,
}

impl SwitchableCache {
    pub async fn new(config: &AppConfig) -> Self {
        Self {
            inner: CacheManager::new(&config.cache)
                .await
                .expect("Failed to init cache"),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::new(ErrorKind::Cache, "Connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheProvider for SwitchableCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.check()?;
        self.inner.health_check().await
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    pub config: AppConfig,
    pub users: Arc<MemoryUserRepository>,
    pub tasks: Arc<MemoryTaskRepository>,
    /// Direct access to the rotation credential store
    pub credentials: CredentialStore,
    /// Number of requests that reached the refresh endpoint
    pub refresh_calls: Arc<AtomicUsize>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let cache = CacheManager::new(&config.cache)
            .await
            .expect("Failed to init cache");
        Self::with_cache(config, cache)
    }

    /// Build the app around an existing key-value store.
    pub fn with_cache(config: AppConfig, cache: CacheManager) -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let tasks = Arc::new(MemoryTaskRepository::new());

        let state = AppState::new(config.clone(), cache, users.clone(), tasks.clone());
        let credentials = state.credentials.clone();

        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&refresh_calls);
        let router = build_app(state).layer(middleware::from_fn(
            move |req: AxumRequest, next: Next| {
                let counter = Arc::clone(&counter);
                async move {
                    if req.uri().path() == "/api/auth/refresh-token" {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    next.run(req).await
                }
            },
        ));

        Self {
            router,
            config,
            users,
            tasks,
            credentials,
            refresh_calls,
        }
    }

    /// Id of a registered user.
    pub async fn user_id(&self, username: &str) -> i64 {
        self.users
            .find_by_username(username)
            .await
            .expect("User lookup failed")
            .expect("User not registered")
            .id
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Register a user and return `(accessToken, refreshToken)`.
    pub async fn register(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/auth/sign-up",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Sign-up failed: {:?}",
            response.body
        );
        response.token_pair()
    }

    /// Make an HTTP request to the test app. `token` is sent verbatim as the
    /// `Authorization` header.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", token);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port and return its base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });
        format!("http://{addr}")
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn token_pair(&self) -> (String, String) {
        let access = self.data()["accessToken"]
            .as_str()
            .expect("No accessToken in response")
            .to_string();
        let refresh = self.data()["refreshToken"]
            .as_str()
            .expect("No refreshToken in response")
            .to_string();
        (access, refresh)
    }

    /// Assert an error envelope with the given status and message.
    pub fn assert_error(&self, status: StatusCode, message: &str) {
        assert_eq!(self.status, status, "body: {:?}", self.body);
        assert_eq!(self.body["status"], "Error");
        assert_eq!(self.message(), message);
    }
}

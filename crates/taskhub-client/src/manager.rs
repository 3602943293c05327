//! Client session manager.
//!
//! Owns the credential pair for one signed-in user. Every authenticated
//! request goes through [`SessionManager::execute`], which:
//!
//! 1. waits for an in-flight refresh, if any,
//! 2. refreshes proactively when the unverified expiry hint has passed,
//! 3. on a `401` refreshes and replays the request exactly once.
//!
//! Refreshes are single-flight: concurrent callers share one outstanding
//! call to the refresh endpoint and all observe its outcome. The refresh
//! runs on its own task so it completes even if every waiter is dropped.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};

use taskhub_core::types::{ApiResponse, ResponseStatus};

use crate::claims::UnverifiedClaims;
use crate::error::SessionError;
use crate::state::{SessionEvent, SessionStatus};
use crate::storage::{SessionStorage, StoredSession};
use crate::tasks::TasksApi;

type RefreshFlight = Shared<BoxFuture<'static, Result<String, SessionError>>>;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
struct Credentials {
    access_token: String,
    refresh_token: String,
    claims: Option<UnverifiedClaims>,
}

impl Credentials {
    fn new(access_token: String, refresh_token: String) -> Self {
        let claims = decode_hint(&access_token);
        Self {
            access_token,
            refresh_token,
            claims,
        }
    }

    fn replace_access(&mut self, access_token: String) {
        self.claims = decode_hint(&access_token);
        self.access_token = access_token;
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

fn decode_hint(access_token: &str) -> Option<UnverifiedClaims> {
    match UnverifiedClaims::decode(access_token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!(error = %e, "Access credential carries no readable expiry hint");
            None
        }
    }
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessBody {
    access_token: String,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
    credentials: RwLock<Option<Credentials>>,
    in_flight: Mutex<Option<RefreshFlight>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Inner {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn current(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    async fn pending(&self) -> Option<RefreshFlight> {
        self.in_flight.lock().await.clone()
    }

    async fn install(&self, credentials: Credentials) -> Result<(), SessionError> {
        let stored = credentials.to_stored();
        *self.credentials.write().await = Some(credentials);
        self.storage.save(&stored).await
    }

    /// Drop both credentials if `refresh_token` is still the one held.
    ///
    /// The in-memory session ends even when the persisted copy cannot be
    /// removed; that failure is only logged.
    async fn clear_if_current(&self, refresh_token: &str) -> bool {
        let mut guard = self.credentials.write().await;
        if !guard
            .as_ref()
            .is_some_and(|c| c.refresh_token == refresh_token)
        {
            return false;
        }
        *guard = None;
        drop(guard);

        if let Err(e) = self.storage.clear().await {
            warn!(error = %e, "Failed to remove persisted session");
        }
        true
    }

    async fn run_refresh(self: Arc<Self>) -> Result<String, SessionError> {
        let outcome = self.perform_refresh().await;
        self.in_flight.lock().await.take();
        outcome
    }

    async fn perform_refresh(&self) -> Result<String, SessionError> {
        let refresh_token = self
            .current()
            .await
            .map(|c| c.refresh_token)
            .ok_or(SessionError::NotAuthenticated)?;

        debug!("Refreshing access credential");

        let access_token = match self.request_access(&refresh_token).await {
            Ok(access_token) => access_token,
            Err(err) => {
                warn!(error = %err, "Credential refresh failed, ending session");
                if self.clear_if_current(&refresh_token).await {
                    self.emit(SessionEvent::Expired);
                }
                return Err(SessionError::SessionExpired);
            }
        };

        let mut guard = self.credentials.write().await;
        let Some(credentials) = guard
            .as_mut()
            .filter(|c| c.refresh_token == refresh_token)
        else {
            // Signed out or replaced while the refresh was in flight.
            return Err(SessionError::NotAuthenticated);
        };
        credentials.replace_access(access_token.clone());
        let stored = credentials.to_stored();
        drop(guard);

        if let Err(e) = self.storage.save(&stored).await {
            warn!(error = %e, "Failed to persist refreshed session");
        }
        self.emit(SessionEvent::Refreshed);
        info!("Access credential refreshed");
        Ok(access_token)
    }

    async fn request_access(&self, refresh_token: &str) -> Result<String, SessionError> {
        let response = self
            .http
            .post(self.url("/api/auth/refresh-token"))
            .json(&RefreshBody { refresh_token })
            .send()
            .await?;
        let body: AccessBody = read_data(response).await?;
        Ok(body.access_token)
    }
}

/// Session manager handle. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.inner.base_url)
            .field("storage", &self.inner.storage)
            .finish()
    }
}

impl SessionManager {
    /// Create a manager talking to `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, storage)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                storage,
                credentials: RwLock::new(None),
                in_flight: Mutex::new(None),
                events,
            }),
        }
    }

    /// Load a previously persisted session, if any.
    pub async fn restore(&self) -> Result<SessionStatus, SessionError> {
        if let Some(stored) = self.inner.storage.load().await? {
            debug!("Restored persisted session");
            *self.inner.credentials.write().await =
                Some(Credentials::new(stored.access_token, stored.refresh_token));
        }
        Ok(self.status().await)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        if self.inner.pending().await.is_some() {
            SessionStatus::Refreshing
        } else if self.inner.credentials.read().await.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner.current().await.map(|c| c.access_token)
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.current().await.map(|c| c.refresh_token)
    }

    /// Claims of the held access credential. Not verified.
    pub async fn claims(&self) -> Option<UnverifiedClaims> {
        self.inner.current().await.and_then(|c| c.claims)
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    /// Create an account and hold the returned credential pair.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), SessionError> {
        self.authenticate("/api/auth/sign-up", username, password)
            .await
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), SessionError> {
        self.authenticate("/api/auth/sign-in", username, password)
            .await
    }

    async fn authenticate(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let response = self
            .inner
            .http
            .post(self.inner.url(path))
            .json(&CredentialsBody { username, password })
            .send()
            .await?;
        let pair: StoredSession = read_data(response).await?;

        self.inner
            .install(Credentials::new(pair.access_token, pair.refresh_token))
            .await?;
        info!(username, "Signed in");
        self.inner.emit(SessionEvent::SignedIn {
            username: Some(username.to_string()),
        });
        Ok(())
    }

    /// Revoke the rotation credential and forget the session.
    ///
    /// Local credentials are discarded even when the server call fails; the
    /// server error is still returned.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let Some(refresh_token) = self.refresh_token().await else {
            return self.inner.storage.clear().await;
        };

        let revoked = async {
            let response = self
                .inner
                .http
                .post(self.inner.url("/api/auth/sign-out"))
                .json(&RefreshBody {
                    refresh_token: &refresh_token,
                })
                .send()
                .await?;
            read_envelope::<serde_json::Value>(response).await.map(drop)
        }
        .await;

        if self.inner.clear_if_current(&refresh_token).await {
            self.inner.emit(SessionEvent::SignedOut);
        }
        info!("Signed out");
        revoked
    }

    /// Obtain a fresh access credential, joining any refresh already in
    /// flight.
    ///
    /// On failure the session is torn down and `SessionExpired` returned.
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let flight = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    debug!("Joining in-flight credential refresh");
                    flight.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(inner.run_refresh());
                    let flight = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(SessionError::Transport(format!("refresh task failed: {e}")))
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// Send an authenticated request, refreshing and replaying once on `401`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, SessionError> {
        if let Some(flight) = self.inner.pending().await {
            flight.await?;
        }

        let credentials = self
            .inner
            .current()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        let mut access_token = credentials.access_token;
        if credentials
            .claims
            .as_ref()
            .is_some_and(|c| c.is_expired_at(Utc::now()))
        {
            debug!("Access credential expired locally, refreshing before request");
            access_token = self.refresh().await?;
        }

        let response = self.send(&method, path, body, &access_token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path, "Access credential rejected, refreshing and replaying");
        let access_token = self.refresh_after(&access_token).await?;
        self.send(&method, path, body, &access_token).await
    }

    /// `execute` and unwrap the `data` of a successful envelope.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, SessionError> {
        let response = self.execute(method, path, body).await?;
        read_data(response).await
    }

    /// `execute` for endpoints that answer with an empty success envelope.
    pub async fn request_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), SessionError> {
        let response = self.execute(method, path, body).await?;
        read_envelope::<serde_json::Value>(response).await.map(drop)
    }

    /// Use a newer credential if another caller already replaced the
    /// rejected one, otherwise refresh.
    async fn refresh_after(&self, rejected: &str) -> Result<String, SessionError> {
        match self.access_token().await {
            Some(current) if current != rejected => Ok(current),
            _ => self.refresh().await,
        }
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        access_token: &str,
    ) -> Result<reqwest::Response, SessionError> {
        let mut request = self
            .inner
            .http
            .request(method.clone(), self.inner.url(path))
            .header(AUTHORIZATION, access_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiResponse<T>, SessionError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
        return Err(SessionError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
    if envelope.status == ResponseStatus::Error {
        return Err(SessionError::Api {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_default(),
        });
    }
    Ok(envelope)
}

async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SessionError> {
    read_envelope(response)
        .await?
        .data
        .ok_or_else(|| SessionError::Decode("response carried no data".to_string()))
}

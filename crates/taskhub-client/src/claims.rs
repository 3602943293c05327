//! Client-side view of access credential claims.
//!
//! The payload is decoded **without** signature verification. It is only a
//! hint for scheduling a proactive refresh; the server re-verifies every
//! protected call and remains the sole authority.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Unverified claims read from an access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedClaims {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl UnverifiedClaims {
    /// Decode the payload of `"<scheme> <header>.<payload>.<signature>"`.
    ///
    /// The scheme prefix is optional.
    pub fn decode(access_token: &str) -> Result<Self, SessionError> {
        let token = access_token
            .rsplit(' ')
            .next()
            .unwrap_or(access_token);

        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| SessionError::Decode("access token has no payload segment".into()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::Decode(format!("access token payload: {e}")))?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the embedded expiry is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

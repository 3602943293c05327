//! `AuthUser` extractor: the verified claims of the calling user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use taskhub_auth::jwt::Claims;
use taskhub_core::error::AppError;

use crate::middleware::auth::verify_headers;
use crate::state::AppState;

/// Claims of the authenticated caller.
///
/// Reuses the claims stored by the access-verification middleware, and
/// verifies the header itself on routes mounted without it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Claims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self(claims.clone()));
        }

        verify_headers(state, &parts.headers).map(Self)
    }
}

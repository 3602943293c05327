//! Access-verification middleware.
//!
//! Every protected request must carry `Authorization: <scheme> <token>`.
//! The checks run in order and the first failure rejects the request before
//! any handler runs:
//!
//! 1. header present, else `MissingAuthHeader` (400)
//! 2. header is `<scheme> <token>` with the configured scheme, else `MalformedToken` (400)
//! 3. signature and expiry verify, else `InvalidToken` (401)
//!
//! On success the verified [`Claims`] are stored in the request extensions.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use taskhub_auth::jwt::Claims;
use taskhub_core::error::AppError;

use crate::state::AppState;

/// Middleware that verifies the access credential and attaches its claims.
pub async fn require_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = verify_headers(&state, request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Run the full header → claims verification.
pub fn verify_headers(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());
    let token = parse_authorization(raw, &state.config.auth.token_scheme)?;
    state.jwt_decoder.decode(token)
}

/// Split an `Authorization` header value into its token.
pub fn parse_authorization<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, AppError> {
    let header = header.ok_or_else(|| AppError::missing_auth_header("No auth header provided"))?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(token), None) if prefix.eq_ignore_ascii_case(scheme) => Ok(token),
        _ => Err(AppError::malformed_token("Invalid token format")),
    }
}

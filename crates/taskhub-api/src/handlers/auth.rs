//! Auth handlers: sign-up, sign-in, sign-out, refresh-token.

use axum::Json;
use axum::extract::State;

use taskhub_auth::credential::TokenPair;
use taskhub_core::error::AppError;
use taskhub_core::types::ApiResponse;

use crate::dto::request::{CredentialsRequest, RefreshTokenRequest};
use crate::dto::response::AccessTokenResponse;
use crate::extractors::ApiJson;
use crate::state::AppState;

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = state.auth.register(req.username(), req.password()).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = state.auth.sign_in(req.username(), req.password()).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth.sign_out(req.refresh_token()).await?;
    Ok(Json(ApiResponse::empty()))
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, AppError> {
    let access_token = state.auth.refresh(req.refresh_token()).await?;
    Ok(Json(ApiResponse::ok(AccessTokenResponse { access_token })))
}

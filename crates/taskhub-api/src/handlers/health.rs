//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use taskhub_core::types::ApiResponse;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

fn component(healthy: bool) -> String {
    if healthy { "up" } else { "down" }.to_string()
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = state.users.health_check().await.unwrap_or(false);
    let store = state.credentials.health_check().await.unwrap_or(false);
    let healthy = database && store;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: component(database),
            credential_store: component(store),
        })),
    )
}

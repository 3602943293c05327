//! Integration tests for the auth endpoints and access verification.

mod helpers;

use axum::http::StatusCode;
use std::sync::Arc;

use serde_json::json;
use tower::ServiceExt;

use taskhub_cache::provider::CacheManager;

use helpers::{SwitchableCache, TEST_SECRET, TestApp, forge_access_token, test_config};

#[tokio::test]
async fn test_sign_up_issues_pair() {
    let app = TestApp::new().await;
    let (access, refresh) = app.register("alice", "password123").await;

    assert!(access.starts_with("Bearer "));
    assert_eq!(access.split('.').count(), 3);
    assert!(!refresh.is_empty());

    let owner = app.credentials.get(&refresh).await.unwrap();
    assert_eq!(owner, Some(app.user_id("alice").await));
}

#[tokio::test]
async fn test_sign_up_duplicate_username() {
    let app = TestApp::new().await;
    app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-up",
            Some(json!({ "username": "alice", "password": "another-pass" })),
            None,
        )
        .await;

    response.assert_error(StatusCode::BAD_REQUEST, "User already exists");
    assert_eq!(app.users.len(), 1);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = TestApp::new().await;

    let cases = [
        (json!({ "username": "alice" }), "Username and password are required"),
        (
            json!({ "username": "", "password": "password123" }),
            "Username and password are required",
        ),
        (
            json!({ "username": "abc", "password": "password123" }),
            "Username and password must be at least 4 characters long",
        ),
        (
            json!({ "username": "alice", "password": "x".repeat(129) }),
            "Username and password must be less than 128 characters long",
        ),
    ];

    for (body, message) in cases {
        let response = app.request("POST", "/api/auth/sign-up", Some(body), None).await;
        response.assert_error(StatusCode::BAD_REQUEST, message);
    }
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_sign_in() {
    let app = TestApp::new().await;
    app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "username": "alice", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "OK");
    let (access, refresh) = response.token_pair();
    assert!(access.starts_with("Bearer "));
    assert!(app.credentials.get(&refresh).await.unwrap().is_some());
}

#[tokio::test]
async fn test_sign_in_failures() {
    let app = TestApp::new().await;
    app.register("alice", "password123").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "username": "alice", "password": "wrong-password" })),
            None,
        )
        .await;
    wrong_password.assert_error(StatusCode::BAD_REQUEST, "Invalid password");

    let unknown = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "username": "nobody", "password": "password123" })),
            None,
        )
        .await;
    unknown.assert_error(StatusCode::NOT_FOUND, "User not found");

    let missing = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "password": "password123" })),
            None,
        )
        .await;
    missing.assert_error(StatusCode::BAD_REQUEST, "Username and password are required");
}

#[tokio::test]
async fn test_each_sign_in_opens_independent_session() {
    let app = TestApp::new().await;
    let (_, first) = app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "username": "alice", "password": "password123" })),
            None,
        )
        .await;
    let (_, second) = response.token_pair();
    assert_ne!(first, second);

    app.request(
        "POST",
        "/api/auth/sign-out",
        Some(json!({ "refreshToken": first })),
        None,
    )
    .await;

    assert!(app.credentials.get(&first).await.unwrap().is_none());
    assert!(app.credentials.get(&second).await.unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_token() {
    let app = TestApp::new().await;
    let (_, refresh) = app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let access = response.data()["accessToken"].as_str().unwrap().to_string();
    assert!(access.starts_with("Bearer "));
    assert!(response.data().get("refreshToken").is_none());

    let tasks = app.request("GET", "/api/tasks", None, Some(&access)).await;
    assert_eq!(tasks.status, StatusCode::OK);

    // The rotation credential is not consumed by a refresh.
    assert!(app.credentials.get(&refresh).await.unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_token_failures() {
    let app = TestApp::new().await;

    let missing = app
        .request("POST", "/api/auth/refresh-token", Some(json!({})), None)
        .await;
    missing.assert_error(StatusCode::BAD_REQUEST, "Refresh token is required");

    let unknown = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": "not-a-real-token" })),
            None,
        )
        .await;
    unknown.assert_error(StatusCode::BAD_REQUEST, "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_for_deleted_user() {
    let app = TestApp::new().await;
    let (_, refresh) = app.register("alice", "password123").await;
    assert!(app.users.remove(app.user_id("alice").await));

    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    response.assert_error(StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_sign_out_revokes_rotation_credential() {
    let app = TestApp::new().await;
    let (access, refresh) = app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-out",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "OK" }));

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    refreshed.assert_error(StatusCode::BAD_REQUEST, "Invalid refresh token");

    // Access credentials are stateless and stay valid until they expire.
    let tasks = app.request("GET", "/api/tasks", None, Some(&access)).await;
    assert_eq!(tasks.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sign_out_unknown_token_succeeds() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-out",
            Some(json!({ "refreshToken": "never-issued" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let missing = app
        .request("POST", "/api/auth/sign-out", Some(json!({})), None)
        .await;
    missing.assert_error(StatusCode::BAD_REQUEST, "Refresh token is required");
}

#[tokio::test]
async fn test_protected_route_header_checks() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/tasks", None, None).await;
    missing.assert_error(StatusCode::BAD_REQUEST, "No auth header provided");

    for header in ["Bearer", "abc.def.ghi", "Basic abc.def.ghi", "Bearer a b"] {
        let response = app.request("GET", "/api/tasks", None, Some(header)).await;
        response.assert_error(StatusCode::BAD_REQUEST, "Invalid token format");
    }

    let garbage = app
        .request("GET", "/api/tasks", None, Some("Bearer not.a.jwt"))
        .await;
    garbage.assert_error(StatusCode::UNAUTHORIZED, "Invalid token");
}

#[tokio::test]
async fn test_protected_route_rejects_bad_signature_and_expiry() {
    let app = TestApp::new().await;
    app.register("alice", "password123").await;
    let id = app.user_id("alice").await;

    let wrong_secret = forge_access_token("some-other-secret", id, "alice", 3600);
    let response = app
        .request("GET", "/api/tasks", None, Some(&wrong_secret))
        .await;
    response.assert_error(StatusCode::UNAUTHORIZED, "Invalid token");

    let expired = forge_access_token(TEST_SECRET, id, "alice", -3600);
    let response = app.request("GET", "/api/tasks", None, Some(&expired)).await;
    response.assert_error(StatusCode::UNAUTHORIZED, "Invalid token");

    let valid = forge_access_token(TEST_SECRET, id, "alice", 3600);
    let response = app.request("GET", "/api/tasks", None, Some(&valid)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/auth/sign-in")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["credential_store"], "up");
}

#[tokio::test]
async fn test_credential_store_outage_is_reported_as_storage_error() {
    let config = test_config();
    let store = Arc::new(SwitchableCache::new(&config).await);
    let app = TestApp::with_cache(config, CacheManager::from_provider(store.clone()));
    let (access, refresh) = app.register("alice", "password123").await;

    store.set_offline(true);

    let sign_in = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({ "username": "alice", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(sign_in.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        sign_in.body,
        json!({ "status": "Error", "message": "Storage unavailable" })
    );

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        refreshed.body,
        json!({ "status": "Error", "message": "Storage unavailable" })
    );

    // Access verification never touches the store.
    let tasks = app.request("GET", "/api/tasks", None, Some(&access)).await;
    assert_eq!(tasks.status, StatusCode::OK);

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.data()["credential_store"], "down");

    store.set_offline(false);
    let recovered = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(recovered.status, StatusCode::OK);
}

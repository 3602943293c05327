//! Integration tests for the client session manager against a live server.

mod helpers;

use std::sync::Arc;

use futures::future::join_all;

use taskhub_client::{
    MemorySessionStorage, SessionError, SessionEvent, SessionManager, SessionStatus,
    SessionStorage, StoredSession,
};
use taskhub_entity::task::{NewTask, TaskPatch, TaskStatus};

use helpers::{TEST_SECRET, TestApp, forge_access_token};

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        status: TaskStatus::Backlog,
    }
}

/// Server-registered user whose stored session holds `access_token`
/// alongside a real rotation credential.
async fn seeded_session(
    app: &TestApp,
    base_url: &str,
    access_token: impl FnOnce(i64) -> String,
) -> (SessionManager, Arc<MemorySessionStorage>) {
    let (_, refresh_token) = app.register("alice", "password123").await;
    let id = app.user_id("alice").await;

    let storage = Arc::new(MemorySessionStorage::new());
    storage
        .save(&StoredSession {
            access_token: access_token(id),
            refresh_token,
        })
        .await
        .unwrap();

    let session = SessionManager::new(base_url, storage.clone());
    assert_eq!(session.restore().await.unwrap(), SessionStatus::Authenticated);
    (session, storage)
}

#[tokio::test]
async fn test_register_and_use_tasks() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let storage = Arc::new(MemorySessionStorage::new());
    let session = SessionManager::new(&base_url, storage.clone());
    let mut events = session.subscribe();

    session.register("alice", "password123").await.unwrap();
    assert_eq!(session.status().await, SessionStatus::Authenticated);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedIn {
            username: Some("alice".to_string())
        }
    );
    assert_eq!(session.claims().await.unwrap().username, "alice");
    assert!(storage.load().await.unwrap().is_some());

    let tasks = session.tasks();
    let created = tasks.create(&new_task("Write report")).await.unwrap();
    assert_eq!(created.status, TaskStatus::Backlog);

    let updated = tasks
        .update(
            created.id,
            &TaskPatch {
                status: Some(TaskStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Closed);
    assert_eq!(tasks.get(created.id).await.unwrap(), updated);
    assert_eq!(tasks.list().await.unwrap(), vec![updated]);

    tasks.delete(created.id).await.unwrap();
    let err = tasks.get(created.id).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Api {
            status: 404,
            message: "Task not found".to_string()
        }
    );
    assert_eq!(app.refresh_count(), 0);
}

#[tokio::test]
async fn test_sign_in_errors_surface_server_message() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    app.register("alice", "password123").await;

    let session = SessionManager::new(&base_url, Arc::new(MemorySessionStorage::new()));
    let err = session.sign_in("alice", "wrong-password").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err,
        SessionError::Api {
            status: 400,
            message: "Invalid password".to_string()
        }
    );
    assert_eq!(session.status().await, SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_sign_out_revokes_and_forgets() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let storage = Arc::new(MemorySessionStorage::new());
    let session = SessionManager::new(&base_url, storage.clone());

    session.register("alice", "password123").await.unwrap();
    let refresh_token = session.refresh_token().await.unwrap();
    let mut events = session.subscribe();

    session.sign_out().await.unwrap();

    assert_eq!(session.status().await, SessionStatus::Anonymous);
    assert!(storage.load().await.unwrap().is_none());
    assert!(app.credentials.get(&refresh_token).await.unwrap().is_none());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
    assert_eq!(
        session.tasks().list().await.unwrap_err(),
        SessionError::NotAuthenticated
    );
}

#[tokio::test]
async fn test_restored_session_is_usable() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let storage = Arc::new(MemorySessionStorage::new());

    let first = SessionManager::new(&base_url, storage.clone());
    first.register("alice", "password123").await.unwrap();
    first.tasks().create(&new_task("Persisted")).await.unwrap();

    let second = SessionManager::new(&base_url, storage);
    assert_eq!(second.restore().await.unwrap(), SessionStatus::Authenticated);
    let tasks = second.tasks().list().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Persisted");
}

#[tokio::test]
async fn test_rejected_request_is_refreshed_and_replayed() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, storage) = seeded_session(&app, &base_url, |id| {
        forge_access_token("rotated-away-secret", id, "alice", 3600)
    })
    .await;
    let stale = session.access_token().await.unwrap();
    let mut events = session.subscribe();

    let tasks = session.tasks().list().await.unwrap();
    assert!(tasks.is_empty());

    assert_eq!(app.refresh_count(), 1);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Refreshed);
    let fresh = session.access_token().await.unwrap();
    assert_ne!(fresh, stale);
    assert_eq!(storage.load().await.unwrap().unwrap().access_token, fresh);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_refresh() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, _) = seeded_session(&app, &base_url, |id| {
        forge_access_token("rotated-away-secret", id, "alice", 3600)
    })
    .await;

    let results = join_all((0..8).map(|_| {
        let session = session.clone();
        async move { session.tasks().list().await }
    }))
    .await;

    for result in results {
        assert!(result.unwrap().is_empty());
    }
    assert_eq!(app.refresh_count(), 1);
    assert_eq!(session.status().await, SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_concurrent_explicit_refreshes_are_single_flight() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, _) = seeded_session(&app, &base_url, |id| {
        forge_access_token(TEST_SECRET, id, "alice", 3600)
    })
    .await;

    let tokens = join_all((0..5).map(|_| session.refresh())).await;
    let first = tokens[0].clone().unwrap();
    assert!(tokens.iter().all(|t| t.as_ref() == Ok(&first)));
    assert_eq!(app.refresh_count(), 1);
}

#[tokio::test]
async fn test_locally_expired_credential_refreshes_before_sending() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, _) = seeded_session(&app, &base_url, |id| {
        forge_access_token(TEST_SECRET, id, "alice", -3600)
    })
    .await;

    session.tasks().list().await.unwrap();

    assert_eq!(app.refresh_count(), 1);
    let claims = session.claims().await.unwrap();
    assert!(!claims.is_expired_at(chrono::Utc::now()));
}

#[tokio::test]
async fn test_revoked_rotation_credential_ends_session() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, storage) = seeded_session(&app, &base_url, |id| {
        forge_access_token("rotated-away-secret", id, "alice", 3600)
    })
    .await;
    let refresh_token = session.refresh_token().await.unwrap();
    app.credentials.delete(&refresh_token).await.unwrap();
    let mut events = session.subscribe();

    let err = session.tasks().list().await.unwrap_err();

    assert_eq!(err, SessionError::SessionExpired);
    assert_eq!(session.status().await, SessionStatus::Anonymous);
    assert!(storage.load().await.unwrap().is_none());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
    assert_eq!(app.refresh_count(), 1);
}

#[tokio::test]
async fn test_concurrent_requests_all_fail_on_revoked_session() {
    let app = TestApp::new().await;
    let base_url = app.spawn().await;
    let (session, _) = seeded_session(&app, &base_url, |id| {
        forge_access_token("rotated-away-secret", id, "alice", 3600)
    })
    .await;
    let refresh_token = session.refresh_token().await.unwrap();
    app.credentials.delete(&refresh_token).await.unwrap();

    let results = join_all((0..4).map(|_| {
        let session = session.clone();
        async move { session.tasks().list().await }
    }))
    .await;

    for result in results {
        let err = result.unwrap_err();
        assert!(
            matches!(err, SessionError::SessionExpired | SessionError::NotAuthenticated),
            "{err:?}"
        );
    }
    assert_eq!(app.refresh_count(), 1);
}

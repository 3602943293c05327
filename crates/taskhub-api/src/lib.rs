//! # taskhub-api
//!
//! HTTP API layer for TaskHub built on Axum.
//!
//! Provides the auth and task endpoints, the access-verification and request
//! logging middleware, extractors, DTOs, and application state wiring.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;

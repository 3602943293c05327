//! # taskhub-entity
//!
//! Domain entity models for TaskHub. Every struct in this crate represents
//! a database table row or a value object used to create or modify one.
//! Database entities additionally derive `sqlx::FromRow`.

pub mod task;
pub mod user;

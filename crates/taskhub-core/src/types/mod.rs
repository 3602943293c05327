//! Core type definitions used across the TaskHub workspace.

pub mod response;

pub use response::{ApiResponse, ResponseStatus};

//! Rotation credential persistence and credential issuance.

pub mod issuer;
pub mod store;

pub use issuer::{CredentialIssuer, TokenPair};
pub use store::CredentialStore;

//! # taskhub-auth
//!
//! Authentication and credential lifecycle for TaskHub.
//!
//! ## Modules
//!
//! - `credential` — rotation credential store and access/rotation credential issuance
//! - `jwt` — signed access credential claims, encoding, and verification
//! - `password` — Argon2id password hashing and credential length policy
//! - `service` — register, sign-in, sign-out, and refresh flows

pub mod credential;
pub mod jwt;
pub mod password;
pub mod service;

pub use credential::{CredentialIssuer, CredentialStore, TokenPair};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{CredentialPolicy, PasswordHasher};
pub use service::AuthService;

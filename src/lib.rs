//! Security Service - credential storage and JWT issuance
//!
//! Users sign up with username, email and password, log in with either
//! identifier, and exchange refresh tokens for new token pairs.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, ExpiryMinutes)
//! - [`config`] - YAML configuration with environment overrides
//! - [`password`] - Argon2id password hashing
//! - [`credential`] - Credential and refresh-token storage
//! - [`token`] - JWT codec and token service
//! - [`user_auth`] - Signup, login, refresh and the signup hook
//! - [`gateway`] - HTTP gateway (axum) and OpenAPI docs

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod credential;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod password;
pub mod token;
pub mod user_auth;

// Convenient re-exports at crate root
pub use config::{AppConfig, JwtSettings, SignupFailurePolicy};
pub use core_types::UserId;
pub use credential::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use password::PasswordHasher;
pub use token::{TokenError, TokenService};
pub use user_auth::{AuthError, AuthenticationService, TokenData};

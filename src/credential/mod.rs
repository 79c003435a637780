//! Credential storage module
//!
//! - `models`: UserCredential and RefreshTokenRecord
//! - `store`: the `CredentialStore` trait and its error type
//! - `memory`: DashMap-backed store for tests and local runs
//! - `postgres`: PostgreSQL store used in deployments

pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryCredentialStore;
pub use models::{RefreshTokenRecord, UserCredential};
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, StoreError};

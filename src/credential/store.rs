//! Credential store abstraction
//!
//! The authentication and token services only see this trait, which keeps
//! business logic independent of the backing database and lets tests run
//! against the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::{RefreshTokenRecord, UserCredential};
use crate::core_types::UserId;

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (field name attached).
    #[error("Duplicate value for unique field: {0}")]
    Duplicate(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Persistence of credentials and per-user refresh tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new credential.
    ///
    /// Fails with [`StoreError::Duplicate`] when the username or the email
    /// is already taken.
    async fn create_credential(&self, credential: &UserCredential) -> Result<(), StoreError>;

    /// Look a credential up by its ID.
    async fn get_credential(&self, user_id: UserId) -> Result<Option<UserCredential>, StoreError>;

    /// All credentials whose username or email equals `login`.
    async fn find_by_username_or_email(
        &self,
        login: &str,
    ) -> Result<Vec<UserCredential>, StoreError>;

    /// Remove a credential and its refresh token record.
    ///
    /// Returns `false` if nothing was deleted.
    async fn delete_credential(&self, user_id: UserId) -> Result<bool, StoreError>;

    /// The refresh token record of a user, if one was ever issued.
    async fn get_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Create the user's refresh token record or overwrite its token and
    /// issue time in place. Never produces a second record for the same user.
    async fn upsert_refresh_token(
        &self,
        user_id: UserId,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError>;
}

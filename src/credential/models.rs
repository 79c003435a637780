//! Credential store entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_types::{RecordId, UserId};

/// A registered user's login credential.
///
/// `password` always holds the argon2 PHC string, never the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCredential {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl UserCredential {
    /// Build a new credential with a fresh identity.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: UserId::new_v4(),
            username,
            email,
            password: password_hash,
            created_at: Utc::now(),
        }
    }
}

/// The single persisted refresh token of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(user_id: UserId, token: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new_v4(),
            user_id,
            token,
            issued_at,
        }
    }
}

//! Token claim sets
//!
//! Every token carries the registered claims in [`Claims`]; the `body`
//! is flattened into the same JSON object so the wire payload looks like
//! `{"iss":..,"aud":..,"iat":..,"nbf":..,"exp":..,"sub":..,"jti":..}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core_types::UserId;
use crate::credential::UserCredential;

/// Registered claims plus a token-kind specific body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims<C> {
    pub iss: String,
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Not before (unix seconds), equal to `iat`
    pub nbf: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    #[serde(flatten)]
    pub body: C,
}

/// Identity claims of an access token.
///
/// Fields default to empty so a token lacking one still decodes and
/// [`AccessClaims::missing_claim`] can name it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccessClaims {
    /// User ID
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Username
    #[serde(default)]
    pub name: String,
    /// Name identifier (the username)
    #[serde(default)]
    pub nameid: String,
    #[serde(default)]
    pub jti: String,
}

impl AccessClaims {
    pub fn for_user(user: &UserCredential) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.username.clone(),
            nameid: user.username.clone(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// First identity claim that is absent or empty.
    pub fn missing_claim(&self) -> Option<&'static str> {
        [
            ("sub", &self.sub),
            ("email", &self.email),
            ("name", &self.name),
            ("nameid", &self.nameid),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Refresh tokens only carry what is needed to re-derive identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Makes two refresh tokens issued in the same second differ
    pub jti: String,
}

impl RefreshClaims {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

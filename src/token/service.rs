//! Access/refresh token issuance and validation
//!
//! Access tokens are stateless: valid iff signature, issuer, audience and
//! lifetime check out and the identity claims are present. Refresh tokens
//! are stateful: each user has exactly one stored refresh token record,
//! overwritten on every issuance.

use chrono::Utc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

use super::claims::{AccessClaims, Claims, RefreshClaims};
use super::codec::TokenCodec;
use super::error::{IssueError, TokenError};
use crate::config::JwtSettings;
use crate::core_types::{ExpiryMinutes, UserId};
use crate::credential::{CredentialStore, StoreError};

pub struct TokenService {
    access: TokenCodec,
    refresh: TokenCodec,
    access_expiry: ExpiryMinutes,
    refresh_expiry: ExpiryMinutes,
    strict_rotation: bool,
    store: Arc<dyn CredentialStore>,
}

impl TokenService {
    pub fn new(settings: &JwtSettings, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            access: TokenCodec::new(
                &settings.access_token_secret,
                &settings.issuer,
                &settings.audience,
            ),
            refresh: TokenCodec::new(
                &settings.refresh_token_secret,
                &settings.issuer,
                &settings.audience,
            ),
            access_expiry: settings.access_token_expiration,
            refresh_expiry: settings.refresh_token_expiration,
            strict_rotation: settings.strict_rotation,
            store,
        }
    }

    /// Issue an access token for `user_id`.
    ///
    /// Returns `None` when no credential exists for the user.
    pub async fn issue_access_token(&self, user_id: UserId) -> Result<Option<String>, IssueError> {
        let Some(user) = self.store.get_credential(user_id).await? else {
            debug!(%user_id, "Access token requested for unknown user");
            return Ok(None);
        };

        let token = self
            .access
            .sign(&AccessClaims::for_user(&user), self.access_expiry)?;
        Ok(Some(token))
    }

    /// Issue a refresh token and make it the user's only stored one.
    pub async fn issue_refresh_token(&self, user_id: UserId) -> Result<String, IssueError> {
        let issued_at = Utc::now();
        let token = self.refresh.sign_at(
            &RefreshClaims::for_user(user_id),
            issued_at,
            self.refresh_expiry,
        )?;

        self.store
            .upsert_refresh_token(user_id, &token, issued_at)
            .await?;
        Ok(token)
    }

    /// Verify an access token and its identity claims.
    pub fn authenticate_access_token(
        &self,
        token: &str,
    ) -> Result<Claims<AccessClaims>, TokenError> {
        let claims = self.access.verify::<AccessClaims>(token)?;
        if let Some(missing) = claims.body.missing_claim() {
            return Err(TokenError::MissingClaim(missing.to_string()));
        }
        Ok(claims)
    }

    /// True iff `token` is a currently valid access token.
    ///
    /// Purely cryptographic: the store is not consulted.
    pub fn validate_access_token(&self, token: &str) -> bool {
        match self.authenticate_access_token(token) {
            Ok(_) => true,
            Err(e) => {
                debug!(reason = e.name(), "Access token rejected");
                false
            }
        }
    }

    /// Subject of an access token, read without verifying it.
    ///
    /// The access token may already be expired; it only has to parse.
    pub fn subject_of(&self, access_token: &str) -> Option<UserId> {
        TokenCodec::parse::<AccessClaims>(access_token)
            .ok()
            .and_then(|c| c.body.user_id())
    }

    /// True iff `candidate` may be exchanged for a new pair on behalf of the
    /// subject of `access_token`.
    ///
    /// Requires a stored record for the subject and a verifiable refresh
    /// token for the same subject. Under strict rotation the candidate must
    /// also be the token currently stored, so superseded tokens fail at once.
    pub async fn validate_refresh_token(
        &self,
        candidate: &str,
        access_token: &str,
    ) -> Result<bool, StoreError> {
        let Some(user_id) = self.subject_of(access_token) else {
            debug!("Refresh rejected: access token has no readable subject");
            return Ok(false);
        };

        let Some(record) = self.store.get_refresh_token(user_id).await? else {
            debug!(%user_id, "Refresh rejected: no refresh token on record");
            return Ok(false);
        };

        let claims = match self.refresh.verify::<RefreshClaims>(candidate) {
            Ok(c) => c,
            Err(e) => {
                debug!(%user_id, reason = e.name(), "Refresh token rejected");
                return Ok(false);
            }
        };

        if claims.body.sub != user_id.to_string() {
            debug!(%user_id, "Refresh rejected: token belongs to another subject");
            return Ok(false);
        }

        if self.strict_rotation {
            let current: bool = candidate.as_bytes().ct_eq(record.token.as_bytes()).into();
            if !current {
                debug!(%user_id, "Refresh rejected: token superseded by a later issuance");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

//! HS256 token codec
//!
//! One codec per secret. Verification checks signature, issuer, audience,
//! `exp` and `nbf` with zero leeway: a token is expired the second after
//! its `exp`.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

use super::claims::Claims;
use super::error::TokenError;
use crate::core_types::ExpiryMinutes;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies tokens for one secret/issuer/audience triple.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            validation,
        }
    }

    /// Sign `claims` valid from now for `expiry_minutes`.
    pub fn sign<C: Serialize>(
        &self,
        claims: &C,
        expiry_minutes: ExpiryMinutes,
    ) -> Result<String, TokenError> {
        self.sign_at(claims, Utc::now(), expiry_minutes)
    }

    /// Sign `claims` as if issued at `issued_at`.
    pub fn sign_at<C: Serialize>(
        &self,
        claims: &C,
        issued_at: DateTime<Utc>,
        expiry_minutes: ExpiryMinutes,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let exp = expires_at(issued_at, expiry_minutes)
            .ok_or_else(|| {
                TokenError::Encoding(format!("expiry of {} minutes overflows", expiry_minutes))
            })?
            .timestamp();
        let payload = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            nbf: iat,
            exp,
            body: claims,
        };

        encode(&Header::new(ALGORITHM), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature, issuer, audience and lifetime, then decode.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<Claims<C>, TokenError> {
        let data = decode::<Claims<C>>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Decode without checking the signature or lifetime.
    ///
    /// Only for reading claims out of a token that was authenticated
    /// elsewhere (e.g. the subject of a possibly expired access token).
    pub fn parse<C: DeserializeOwned>(token: &str) -> Result<Claims<C>, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let data = decode::<Claims<C>>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }
}

/// `issued_at + expiry_minutes`, or `None` when it leaves chrono's range.
pub fn expires_at(
    issued_at: DateTime<Utc>,
    expiry_minutes: ExpiryMinutes,
) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(expiry_minutes).and_then(|d| issued_at.checked_add_signed(d))
}

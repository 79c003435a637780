//! Token error types.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::credential::StoreError;

/// Why a token failed to sign, parse or verify.
///
/// Callers at the service boundary collapse every variant to "invalid";
/// the variant is only logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token issuer does not match")]
    IssuerMismatch,

    #[error("Token audience does not match")]
    AudienceMismatch,

    #[error("Token is missing required claim: {0}")]
    MissingClaim(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Expired => "EXPIRED",
            Self::NotYetValid => "NOT_YET_VALID",
            Self::IssuerMismatch => "ISSUER_MISMATCH",
            Self::AudienceMismatch => "AUDIENCE_MISMATCH",
            Self::MissingClaim(_) => "MISSING_CLAIM",
            Self::Malformed(_) => "MALFORMED",
            Self::Encoding(_) => "ENCODING",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Failures while issuing tokens.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Token signing failed: {0}")]
    Signing(#[from] TokenError),
}

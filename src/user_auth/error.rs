//! Authentication error types.
//!
//! One error per failure class a caller can act on. Token failures carry no
//! reason: every invalid token looks the same from outside.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::credential::StoreError;
use crate::gateway::types::{ApiResponse, error_codes};
use crate::password::PasswordError;
use crate::token::{IssueError, TokenError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("A credential with this {0} already exists")]
    DuplicateCredential(&'static str),

    #[error("User not found")]
    UnknownUser,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Profile service notification failed: {0}")]
    DownstreamNotificationFailure(String),

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error("Token signing failed: {0}")]
    Token(TokenError),

    #[error(transparent)]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// API error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(_) => error_codes::INVALID_PARAMETER,
            Self::DuplicateCredential(_) => error_codes::DUPLICATE_CREDENTIAL,
            Self::UnknownUser => error_codes::NOT_FOUND,
            Self::InvalidToken => error_codes::INVALID_TOKEN,
            Self::DownstreamNotificationFailure(_) => error_codes::DOWNSTREAM_FAILURE,
            Self::Hashing(_) | Self::Token(_) | Self::Store(_) | Self::Internal(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// Get HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateCredential(_) => StatusCode::CONFLICT,
            Self::UnknownUser => StatusCode::NOT_FOUND,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::DownstreamNotificationFailure(_) => StatusCode::BAD_GATEWAY,
            Self::Hashing(_) | Self::Token(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(_) | Self::DuplicateCredential(_) | Self::InvalidToken => {
                self.to_string()
            }
            Self::UnknownUser => "User not found".to_string(),
            Self::DownstreamNotificationFailure(_) => "Profile service unavailable".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => Self::DuplicateCredential(field),
            other => Self::Store(other),
        }
    }
}

impl From<IssueError> for AuthError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Store(e) => e.into(),
            IssueError::Signing(e) => Self::Token(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!("Auth request failed: {}", self);
        }
        let body = ApiResponse::<()>::error(self.code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

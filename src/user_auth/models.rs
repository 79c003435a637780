use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User Registration Request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(email(message = "email is not valid"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email
    #[schema(example = "alice")]
    pub username_email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Access/refresh token pair returned by signup, login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
}

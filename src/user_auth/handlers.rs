use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::error::AuthError;
use super::extract::{ApiJson, ApiQuery};
use super::middleware::BearerToken;
use super::models::{LoginRequest, SignupRequest, TokenData};
use crate::gateway::{state::AppState, types::ApiResponse};

/// Register a new user
///
/// POST /api/Auth/SignUp
#[utoipa::path(
    post,
    path = "/api/Auth/SignUp",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User registered", body = ApiResponse<TokenData>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists"),
        (status = 502, description = "Profile service notification failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Json<ApiResponse<TokenData>>, AuthError> {
    let tokens = state.auth.sign_up(req).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// Log in by username or email
///
/// POST /api/Auth/LogIn
#[utoipa::path(
    post,
    path = "/api/Auth/LogIn",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenData>),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "No single credential matches"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn log_in(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenData>>, AuthError> {
    match state.auth.log_in(req).await? {
        Some(tokens) => Ok(Json(ApiResponse::success(tokens))),
        None => Err(AuthError::UnknownUser),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RefreshTokenQuery {
    /// Refresh token issued with the presented access token
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Exchange a refresh token for a new token pair
///
/// POST /api/Auth/RefreshToken?refreshToken=...
///
/// The bearer access token may be expired.
#[utoipa::path(
    post,
    path = "/api/Auth/RefreshToken",
    params(RefreshTokenQuery),
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<TokenData>),
        (status = 400, description = "Missing refreshToken query parameter"),
        (status = 401, description = "Invalid refresh token"),
        (status = 403, description = "Missing or malformed bearer header")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(BearerToken(access_token)): Extension<BearerToken>,
    ApiQuery(query): ApiQuery<RefreshTokenQuery>,
) -> Result<Json<ApiResponse<TokenData>>, AuthError> {
    let tokens = state
        .auth
        .refresh_token(&access_token, &query.refresh_token)
        .await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// Check the bearer access token
///
/// POST /api/Auth/ValidateToken
#[utoipa::path(
    post,
    path = "/api/Auth/ValidateToken",
    responses(
        (status = 200, description = "Whether the access token is valid", body = ApiResponse<bool>),
        (status = 403, description = "Missing or malformed bearer header")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Extension(BearerToken(access_token)): Extension<BearerToken>,
) -> Json<ApiResponse<bool>> {
    Json(ApiResponse::success(
        state.tokens.validate_access_token(&access_token),
    ))
}

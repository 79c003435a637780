//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResponse, error_codes};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Build version (git hash)
    #[schema(example = "a1b2c3d")]
    pub version: String,
    /// Credential store backend
    #[schema(example = "postgres")]
    pub store: String,
}

/// Health check endpoint
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, version, store}}
/// - Unhealthy: 503 Service Unavailable (PostgreSQL unreachable)
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (
            status = 200,
            description = "Service healthy",
            body = ApiResponse<HealthResponse>,
            content_type = "application/json"
        ),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store = match state.pg_db {
        Some(ref db) => {
            if let Err(e) = db.health_check().await {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse {
                        code: error_codes::SERVICE_UNAVAILABLE,
                        msg: "unavailable".to_string(),
                        data: None,
                    }),
                );
            }
            "postgres"
        }
        None => "memory",
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            version: env!("GIT_HASH").to_string(),
            store: store.to_string(),
        })),
    )
}

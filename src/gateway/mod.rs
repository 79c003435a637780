pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::user_auth::{handlers as auth_handlers, middleware::require_bearer};
use state::AppState;

/// Build the HTTP router: auth routes, health and API docs.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Open auth routes
    let open_routes = Router::new()
        .route("/SignUp", post(auth_handlers::sign_up))
        .route("/LogIn", post(auth_handlers::log_in));

    // Bearer header required (403 otherwise)
    let bearer_routes = Router::new()
        .route("/RefreshToken", post(auth_handlers::refresh_token))
        .route("/ValidateToken", post(auth_handlers::validate_token))
        .layer(from_fn(require_bearer));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .nest("/api/Auth", open_routes.merge(bearer_routes))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}

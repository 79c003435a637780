//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::user_auth::{LoginRequest, SignupRequest, TokenData};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    Http::builder()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token returned by SignUp, LogIn or RefreshToken",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Security Service API",
        version = "1.0.0",
        description = "Credential storage and JWT access/refresh token issuance.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::user_auth::handlers::sign_up,
        crate::user_auth::handlers::log_in,
        crate::user_auth::handlers::refresh_token,
        crate::user_auth::handlers::validate_token,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            LoginRequest,
            TokenData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login and token exchange"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

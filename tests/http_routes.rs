use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use security_service::config::JwtSettings;
use security_service::credential::MemoryCredentialStore;
use security_service::gateway::{build_router, state::AppState};
use security_service::password::{PasswordConfig, PasswordHasher};
use security_service::token::TokenService;
use security_service::user_auth::AuthenticationService;

// Helper to create a router over a fresh in-memory store
fn test_router() -> Router {
    let jwt = JwtSettings {
        access_token_secret: "http-access-secret-http-access-secret-0".into(),
        refresh_token_secret: "http-refresh-secret-http-refresh-secret".into(),
        issuer: "security-service".into(),
        audience: "security-service-clients".into(),
        access_token_expiration: 15,
        refresh_token_expiration: 60,
        strict_rotation: true,
    };
    let store = Arc::new(MemoryCredentialStore::new());
    let tokens = Arc::new(TokenService::new(&jwt, store.clone()));
    let hasher = PasswordHasher::new(PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let auth = Arc::new(AuthenticationService::new(store, tokens, hasher));
    build_router(Arc::new(AppState::new(auth, None)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn sign_up(app: &Router, username: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        post_json(
            "/api/Auth/SignUp",
            json!({"username": username, "email": email, "password": "pw1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    (
        body["data"]["accessToken"].as_str().unwrap().to_string(),
        body["data"]["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signup_then_duplicate_conflict() {
    let app = test_router();
    sign_up(&app, "alice", "a@x.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/Auth/SignUp",
            json!({"username": "alice", "email": "b@x.com", "password": "pw1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1002);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_signup_invalid_email_bad_request() {
    let app = test_router();
    let (status, body) = send(
        &app,
        post_json(
            "/api/Auth/SignUp",
            json!({"username": "alice", "email": "nope", "password": "pw1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_malformed_body_bad_request_envelope() {
    let app = test_router();
    for (uri, body) in [
        ("/api/Auth/SignUp", json!({})),
        ("/api/Auth/SignUp", json!({"username": "alice"})),
        ("/api/Auth/SignUp", json!({"username": 1, "email": "a@x.com", "password": "pw1"})),
        ("/api/Auth/LogIn", json!({"password": "pw1"})),
    ] {
        let (status, resp) = send(&app, post_json(uri, body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(resp["code"], 1001, "{} {}", uri, body);
    }

    // Not JSON at all
    let req = Request::builder()
        .method("POST")
        .uri("/api/Auth/SignUp")
        .body(Body::from("username=alice"))
        .unwrap();
    let (status, resp) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["code"], 1001);
}

#[tokio::test]
async fn test_refresh_without_query_bad_request_envelope() {
    let app = test_router();
    let (access, _) = sign_up(&app, "alice", "a@x.com").await;

    let (status, body) = send(&app, post_bearer("/api/Auth/RefreshToken", &access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_login_success_and_not_found() {
    let app = test_router();
    sign_up(&app, "alice", "a@x.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/Auth/LogIn",
            json!({"usernameEmail": "a@x.com", "password": "pw1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["accessToken"].is_string());

    let (status, _) = send(
        &app,
        post_json(
            "/api/Auth/LogIn",
            json!({"usernameEmail": "alice", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_token() {
    let app = test_router();
    let (access, refresh) = sign_up(&app, "alice", "a@x.com").await;

    let (status, body) = send(&app, post_bearer("/api/Auth/ValidateToken", &access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    // A refresh token is not an access token
    let (status, body) = send(&app, post_bearer("/api/Auth/ValidateToken", &refresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], false);
}

#[tokio::test]
async fn test_missing_bearer_forbidden() {
    let app = test_router();
    for uri in ["/api/Auth/ValidateToken", "/api/Auth/RefreshToken?refreshToken=x"] {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["code"], 2001);
    }
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let app = test_router();
    let (access, refresh) = sign_up(&app, "alice", "a@x.com").await;

    let uri = format!("/api/Auth/RefreshToken?refreshToken={}", refresh);
    let (status, body) = send(&app, post_bearer(&uri, &access)).await;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(new_refresh, refresh);

    // Old refresh token was superseded
    let (status, body) = send(&app, post_bearer(&uri, &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2003);
}

#[tokio::test]
async fn test_openapi_json_served() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

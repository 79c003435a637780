use axum::{
    Json,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::gateway::types::{ApiResponse, error_codes};

/// Raw bearer token from the `Authorization` header.
///
/// Not verified here: the refresh route accepts expired access tokens, so
/// verification is left to the handler.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

type Rejection = (StatusCode, Json<ApiResponse<()>>);

/// Extract `Bearer <token>` from headers.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, Rejection> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "Missing Authorization header",
            )),
        ))?;

    match auth_header.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Invalid token format",
            )),
        )),
    }
}

/// Rejects requests without a bearer header (403) before they reach the
/// authentication core; otherwise injects [`BearerToken`].
pub async fn require_bearer(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Rejection> {
    let token = extract_bearer(request.headers())?.to_string();
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_or_malformed_header_forbidden() {
        let (status, body) = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, error_codes::MISSING_AUTH);

        for bad in ["Basic dXNlcjpwdw==", "Bearer ", "bearer abc", "abc"] {
            let (status, body) = extract_bearer(&headers(bad)).unwrap_err();
            assert_eq!(status, StatusCode::FORBIDDEN, "{:?}", bad);
            assert_eq!(body.code, error_codes::AUTH_FAILED);
        }
    }
}

//! # Administrative Authentication
//!
//! Bearer-token middleware guarding the `/admin/*` routes. End-user
//! endpoints authenticate with username and password inside the request
//! instead (see [`routes::notarize`](crate::routes::notarize)).
//!
//! ```text
//! Authorization: Bearer {NOTARY_ADMIN_TOKEN}
//! ```
//!
//! When no admin token is configured the administrative surface is
//! disabled and every request to it is refused with 403.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use zeroize::Zeroizing;

use crate::error::{ErrorBody, ErrorDetail};

// ── Secret Token ────────────────────────────────────────────────────────────

/// Admin bearer secret. Zeroed on drop, never printed.
#[derive(Clone)]
pub struct SecretToken(Zeroizing<String>);

impl SecretToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    fn matches(&self, provided: &str) -> bool {
        notary_crypto::constant_time_eq(provided.as_bytes(), self.0.as_bytes())
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
#[derive(Clone, Debug, Default)]
pub struct AdminAuth {
    pub token: Option<SecretToken>,
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Require the admin bearer token.
pub async fn admin_middleware(request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AdminAuth>().cloned().unwrap_or_default();

    let Some(expected) = config.token else {
        tracing::warn!(path = %request.uri().path(), "administrative endpoint called but no admin token is configured");
        return error_response(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "administrative endpoints are disabled",
        );
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) if expected.matches(provided) => next.run(request).await,
            Some(_) => {
                tracing::warn!("admin authentication failed: invalid bearer token");
                unauthorized_response("invalid bearer token")
            }
            None => {
                tracing::warn!("admin authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("admin authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED", message)
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.to_string(),
        },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    fn test_app(token: Option<&str>) -> Router {
        let auth = AdminAuth {
            token: token.map(SecretToken::new),
        };
        Router::new()
            .route("/admin/test", post(|| async { "ok" }))
            .layer(from_fn(admin_middleware))
            .layer(axum::Extension(auth))
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/admin/test");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_is_accepted() {
        let response = test_app(Some("s3cret")).oneshot(request(Some("Bearer s3cret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let response = test_app(Some("s3cret")).oneshot(request(Some("Bearer nope"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn basic_scheme_is_rejected() {
        let response = test_app(Some("s3cret")).oneshot(request(Some("Basic s3cret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let response = test_app(Some("s3cret")).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unconfigured_token_disables_admin() {
        let response = test_app(None).oneshot(request(Some("Bearer anything"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn debug_redacts_secret() {
        let token = SecretToken::new("hunter2");
        assert!(!format!("{token:?}").contains("hunter2"));
    }
}

//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Pipeline errors are routed on their [`ErrorKind`] so handlers never match
//! on collaborator variants. Internal and upstream details are logged but
//! never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notary_core::{Classify, ErrorKind};
use notary_pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Credentials missing or rejected (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Endpoint disabled or caller not permitted (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness violation (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Recomputed fingerprint disagrees with the ledger (409).
    #[error("integrity mismatch: {0}")]
    IntegrityMismatch(String),

    /// Blob store or ledger failure (502). Message is logged, not returned.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500). Message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, ErrorKind::NotFound.as_str()),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorKind::Validation.as_str()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, ErrorKind::Authentication.as_str()),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, ErrorKind::Conflict.as_str()),
            Self::IntegrityMismatch(_) => (StatusCode::CONFLICT, ErrorKind::IntegrityMismatch.as_str()),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, ErrorKind::Upstream.as_str()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal.as_str()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service failed; retry later".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::warn!(error = %self, "upstream failure"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Authentication => Self::Unauthorized(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::IntegrityMismatch => Self::IntegrityMismatch(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Upstream => Self::Upstream(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }
}

impl From<notary_core::ValidationError> for AppError {
    fn from(err: notary_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<notary_crypto::CryptoError> for AppError {
    fn from(err: notary_crypto::CryptoError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::Validation(err.to_string()),
            ErrorKind::Authentication => Self::Unauthorized(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use notary_core::TransactionId;
    use notary_ledger::LedgerError;

    #[test]
    fn status_codes_follow_kinds() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::IntegrityMismatch("x".into()), StatusCode::CONFLICT, "INTEGRITY_MISMATCH"),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[test]
    fn pipeline_errors_map_by_kind() {
        let tx = TransactionId::from_hash_bytes(&[7; 32]);
        let not_found = AppError::from(PipelineError::Ledger {
            stage: "ledger_fetched",
            source: LedgerError::TransactionNotFound(tx.clone()),
        });
        assert!(matches!(not_found, AppError::NotFound(_)));

        let upstream = AppError::from(PipelineError::Ledger {
            stage: "ledger_submitted",
            source: LedgerError::TransactionFailed(tx),
        });
        assert!(matches!(upstream, AppError::Upstream(_)));

        assert!(matches!(
            AppError::from(PipelineError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(AppError::from(PipelineError::MissingKey), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn upstream_details_are_hidden() {
        let response = AppError::Upstream("pinata said 401 with body secret-ish".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "UPSTREAM_ERROR");
        assert!(!body.error.message.contains("secret-ish"));
    }

    #[tokio::test]
    async fn validation_message_is_returned() {
        let response = AppError::Validation("hash_value must not be empty".into()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.message.contains("hash_value must not be empty"));
    }
}

//! # Request Extraction & Validation
//!
//! The [`Validate`] trait for JSON request DTOs, helpers that map Axum's
//! rejections onto [`AppError`], and the sealing-key header shared by the
//! upload and verify handlers.

use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::Json;
use notary_crypto::SealingKey;

use crate::error::AppError;

/// Header carrying a hex sealing key on requests without a body field for it.
pub const SEALING_KEY_HEADER: &str = "x-sealing-key";

/// Business-rule validation beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse an optional hex sealing key. Blank input counts as absent.
pub fn parse_sealing_key(raw: Option<&str>) -> Result<Option<SealingKey>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(hex) => Ok(Some(SealingKey::from_hex(hex)?)),
        None => Ok(None),
    }
}

/// Read the sealing key from [`SEALING_KEY_HEADER`], if present.
pub fn sealing_key_from_headers(headers: &HeaderMap) -> Result<Option<SealingKey>, AppError> {
    let raw = match headers.get(SEALING_KEY_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::Validation("sealing key header is not valid ASCII".into()))?,
        ),
        None => None,
    };
    parse_sealing_key(raw)
}

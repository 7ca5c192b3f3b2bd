//! # Error Taxonomy
//!
//! Structured error types shared across the Notary Stack, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each crate keeps its own error enum with the diagnostic context of the
//! operation that failed. Those enums implement [`Classify`] so that the
//! pipeline and the HTTP layer can route on a single [`ErrorKind`] without
//! matching on every crate's variants.

use thiserror::Error;

/// Coarse classification of every failure the notarization pipeline can
/// produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied input is malformed (empty hash, bad hex key, bad id).
    Validation,
    /// Credentials were rejected, or an AEAD tag failed to verify.
    Authentication,
    /// A transaction, ledger event, index row, or user does not exist.
    NotFound,
    /// A recomputed fingerprint disagrees with the notarized one.
    IntegrityMismatch,
    /// The blob store or ledger failed, timed out, or was unreachable.
    Upstream,
    /// A uniqueness constraint was violated (duplicate username, duplicate
    /// transaction id).
    Conflict,
    /// Anything else: local I/O, database faults, invariant violations.
    Internal,
}

impl ErrorKind {
    /// Machine-readable code used in API error bodies and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTHENTICATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::IntegrityMismatch => "INTEGRITY_MISMATCH",
            Self::Upstream => "UPSTREAM_ERROR",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request later could succeed.
    ///
    /// Only upstream failures are transient. Validation, authentication,
    /// not-found and integrity failures are permanent for the given input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every crate-level error enum in the workspace.
pub trait Classify {
    /// The taxonomy bucket this error belongs to.
    fn kind(&self) -> ErrorKind;
}

/// Validation errors for domain primitive newtypes.
///
/// Each carries the rejected input so operators can diagnose bad requests
/// without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fingerprint is not 64 hex characters.
    #[error("invalid fingerprint: \"{0}\" (expected 64 hex characters)")]
    InvalidFingerprint(String),

    /// Transaction id is not a 0x-prefixed 32-byte hex hash.
    #[error("invalid transaction id: \"{0}\" (expected 0x followed by 64 hex characters)")]
    InvalidTransactionId(String),

    /// Blob address is empty, too long, or contains non-alphanumeric characters.
    #[error("invalid blob address: \"{0}\" (expected 1-128 alphanumeric characters)")]
    InvalidBlobAddress(String),
}

impl Classify for ValidationError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_is_retryable() {
        let all = [
            ErrorKind::Validation,
            ErrorKind::Authentication,
            ErrorKind::NotFound,
            ErrorKind::IntegrityMismatch,
            ErrorKind::Upstream,
            ErrorKind::Conflict,
            ErrorKind::Internal,
        ];
        let retryable: Vec<_> = all.iter().filter(|k| k.is_retryable()).collect();
        assert_eq!(retryable, vec![&ErrorKind::Upstream]);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            ErrorKind::Validation.as_str(),
            ErrorKind::Authentication.as_str(),
            ErrorKind::NotFound.as_str(),
            ErrorKind::IntegrityMismatch.as_str(),
            ErrorKind::Upstream.as_str(),
            ErrorKind::Conflict.as_str(),
            ErrorKind::Internal.as_str(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn validation_error_carries_input() {
        let err = ValidationError::InvalidTransactionId("0xzz".into());
        assert!(err.to_string().contains("0xzz"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

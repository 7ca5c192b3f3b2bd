//! Blob store error types.

use notary_core::{BlobAddress, Classify, ErrorKind, ValidationError};

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The pinning service or gateway returned a non-2xx status.
    #[error("blob store {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned an address that does not look like a CID.
    #[error("blob store returned an invalid address: {0}")]
    InvalidAddress(#[from] ValidationError),
    /// No blob is stored at the address.
    #[error("no blob stored at {0}")]
    NotFound(BlobAddress),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl Classify for BlobStoreError {
    /// A missing blob that the index points at is a storage fault, so every
    /// runtime failure here is an upstream failure.
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Internal,
            _ => ErrorKind::Upstream,
        }
    }
}

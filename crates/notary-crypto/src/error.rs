//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `notary-crypto`.

use notary_core::{Classify, ErrorKind};
use thiserror::Error;

/// Errors from cryptographic operations in the Notary Stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The key string is not valid hex.
    #[error("sealing key is not valid hex: {0}")]
    InvalidKeyHex(String),

    /// The key decoded to the wrong number of bytes.
    #[error("sealing key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The file name cannot be embedded in the plaintext (contains the
    /// 0x00 separator, or is empty).
    #[error("invalid file name for sealing: {0}")]
    InvalidFileName(String),

    /// The container is shorter than a nonce plus an authentication tag.
    #[error("sealed payload too short: {0} bytes")]
    PayloadTooShort(usize),

    /// The authentication tag did not verify (tampered data or wrong key).
    #[error("authentication failed: payload was modified or the key is wrong")]
    AuthenticationFailed,

    /// The plaintext authenticated but does not follow the
    /// `name || 0x00 || bytes` layout.
    #[error("malformed plaintext: {0}")]
    MalformedPlaintext(String),

    /// The cipher refused to encrypt (input exceeds the AES-GCM limit).
    #[error("encryption failed")]
    EncryptionFailed,

    /// Argon2 hashing or digest parsing failed.
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl Classify for CryptoError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKeyHex(_)
            | Self::InvalidKeyLength(_)
            | Self::InvalidFileName(_)
            | Self::MalformedPlaintext(_) => ErrorKind::Validation,
            Self::PayloadTooShort(_) | Self::AuthenticationFailed => ErrorKind::Authentication,
            Self::EncryptionFailed | Self::PasswordHash(_) => ErrorKind::Internal,
        }
    }
}

//! # Content Fingerprint
//!
//! The notarized value. A fingerprint is the SHA-256 digest of a file's raw
//! bytes, rendered as 64 lowercase hex characters when it crosses a process
//! boundary (ledger calldata, index rows, API responses).
//!
//! ## Invariant
//!
//! Upload and verification both compute fingerprints through
//! [`sha256_fingerprint()`]. Parsing with [`ContentFingerprint::from_hex()`]
//! normalizes case, so a fingerprint read back from the ledger compares equal
//! to the one computed locally iff the digests are byte-for-byte identical.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// A SHA-256 content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex fingerprint. Accepts upper or lower case and
    /// an optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if body.len() != FINGERPRINT_HEX_LEN {
            return Err(ValidationError::InvalidFingerprint(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|_| ValidationError::InvalidFingerprint(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentFingerprint({})", self.to_hex())
    }
}

impl std::str::FromStr for ContentFingerprint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentFingerprint> for String {
    fn from(value: ContentFingerprint) -> Self {
        value.to_hex()
    }
}

/// Compute the SHA-256 fingerprint of raw bytes.
pub fn sha256_fingerprint(data: &[u8]) -> ContentFingerprint {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentFingerprint(bytes)
}

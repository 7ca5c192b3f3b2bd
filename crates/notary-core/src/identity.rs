//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for the identifiers that flow through the
//! notarization pipeline. String identifiers ([`TransactionId`],
//! [`BlobAddress`]) validate their format at construction time. Integer
//! identifiers ([`UserId`], [`EntryId`]) are surrogate keys assigned by the
//! index store and are valid by construction.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// String identifiers (validated)
// ---------------------------------------------------------------------------

/// A ledger transaction hash: `0x` followed by 64 hex characters.
///
/// Stored lowercase so that lookups are insensitive to the caller's casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Parse and normalize a transaction hash.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransactionId`] unless the input is
    /// `0x` followed by exactly 64 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let body = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(body) => body,
            None => return Err(ValidationError::InvalidTransactionId(raw)),
        };
        if body.len() != 64 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidTransactionId(raw));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Build a transaction id from 32 raw hash bytes.
    pub fn from_hash_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The normalized `0x`-prefixed lowercase string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TransactionId> for String {
    fn from(value: TransactionId) -> Self {
        value.0
    }
}

/// Maximum accepted length of a blob address.
const MAX_BLOB_ADDRESS_LEN: usize = 128;

/// Address of a blob in the content-addressed store (an IPFS CID for the
/// pinning-service backend).
///
/// CIDv0 (`Qm...`, base58) and CIDv1 (`bafy...`, base32) are both plain
/// alphanumeric strings, so validation is limited to length and alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobAddress(String);

impl BlobAddress {
    /// Validate a blob address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBlobAddress`] if the address is
    /// empty, longer than 128 characters, or not ASCII alphanumeric.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty()
            || s.len() > MAX_BLOB_ADDRESS_LEN
            || !s.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValidationError::InvalidBlobAddress(s));
        }
        Ok(Self(s))
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BlobAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlobAddress> for String {
    fn from(value: BlobAddress) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// Surrogate keys (assigned by the index store)
// ---------------------------------------------------------------------------

/// Surrogate key of a registered user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate key of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    #[test]
    fn transaction_id_accepts_valid_hash() {
        let id = TransactionId::new(TX).unwrap();
        assert_eq!(id.as_str(), TX);
    }

    #[test]
    fn transaction_id_normalizes_case() {
        let id = TransactionId::new(TX.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert_eq!(id.as_str(), TX);
    }

    #[test]
    fn transaction_id_rejects_missing_prefix() {
        assert!(TransactionId::new(&TX[2..]).is_err());
    }

    #[test]
    fn transaction_id_rejects_wrong_length() {
        assert!(TransactionId::new("0x1234").is_err());
        assert!(TransactionId::new(format!("{TX}00")).is_err());
    }

    #[test]
    fn transaction_id_from_hash_bytes() {
        let id = TransactionId::from_hash_bytes(&[0xab; 32]);
        assert_eq!(id.as_str().len(), 66);
        assert!(id.as_str().starts_with("0xabab"));
    }

    #[test]
    fn blob_address_accepts_cids() {
        assert!(BlobAddress::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").is_ok());
        assert!(
            BlobAddress::new("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi").is_ok()
        );
    }

    #[test]
    fn blob_address_rejects_path_characters() {
        assert!(BlobAddress::new("../etc/passwd").is_err());
        assert!(BlobAddress::new("").is_err());
        assert!(BlobAddress::new("a".repeat(129)).is_err());
    }

    #[test]
    fn identifiers_roundtrip_through_json() {
        let id = TransactionId::new(TX).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{TX}\""));
        let user: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(user, UserId(42));
    }
}

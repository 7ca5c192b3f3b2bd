//! # Sealing Keys
//!
//! A [`SealingKey`] is the 256-bit AES-GCM key that seals files before they
//! leave the process. Keys arrive as hex strings (HTTP form fields, CLI
//! flags, environment variables) or raw bytes; both are normalized here so
//! the cipher code only ever sees a validated 32-byte key.
//!
//! ## Security Invariant
//!
//! - Key bytes are zeroized on drop.
//! - `Debug` never prints key material.
//! - Malformed hex is a [`CryptoError`], never a panic.

use rand_core::{OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// A 256-bit AES-GCM sealing key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealingKey([u8; KEY_LEN]);

impl SealingKey {
    /// Generate a fresh random key from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Accept raw key bytes. The slice must be exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        let mut arr = [0u8; KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a hex-encoded key. Surrounding whitespace and a `0x` prefix are
    /// tolerated; case is ignored.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut decoded = hex::decode(body).map_err(|e| CryptoError::InvalidKeyHex(e.to_string()))?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    /// Lowercase hex rendering. Intended for `notary keygen` output only.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealingKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn hex_and_bytes_normalize_to_the_same_key() {
        let from_hex = SealingKey::from_hex(HEX).unwrap();
        let raw: Vec<u8> = (0u8..32).collect();
        let from_bytes = SealingKey::from_bytes(&raw).unwrap();
        assert_eq!(from_hex.as_bytes(), from_bytes.as_bytes());
    }

    #[test]
    fn hex_tolerates_prefix_case_and_whitespace() {
        let key = SealingKey::from_hex(&format!("  0x{}\n", HEX.to_uppercase())).unwrap();
        assert_eq!(key.to_hex(), HEX);
    }

    #[test]
    fn malformed_hex_is_reported() {
        assert!(matches!(
            SealingKey::from_hex("not-hex"),
            Err(CryptoError::InvalidKeyHex(_))
        ));
    }

    #[test]
    fn wrong_length_is_reported() {
        assert_eq!(
            SealingKey::from_hex("abcd").unwrap_err(),
            CryptoError::InvalidKeyLength(2)
        );
        assert_eq!(
            SealingKey::from_bytes(&[0u8; 16]).unwrap_err(),
            CryptoError::InvalidKeyLength(16)
        );
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(SealingKey::generate().to_hex(), SealingKey::generate().to_hex());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SealingKey::from_hex(HEX).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("0a0b"));
    }
}

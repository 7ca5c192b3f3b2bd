//! # notary-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the Notary Stack:
//!
//! - **Sealing keys** normalized from hex strings or raw bytes at a single
//!   boundary, zeroized on drop.
//! - **AES-256-GCM sealing** of a file together with its name, producing the
//!   `nonce(12) || ciphertext || tag(16)` container stored in the blob store.
//! - **Argon2id password digests** for the user table.
//! - **Constant-time comparison** for bearer tokens.
//!
//! ## Crate Policy
//!
//! - Depends only on `notary-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   AES-GCM and real Argon2.
//! - Opening a container fails closed: a tag mismatch never yields bytes.

pub mod error;
pub mod key;
pub mod password;
pub mod seal;

pub use error::CryptoError;
pub use key::SealingKey;
pub use password::{hash_password, verify_password};
pub use seal::{open, seal, OpenedFile, SealedPayload, NONCE_LEN, TAG_LEN};

/// Compare two byte strings in constant time with respect to their contents.
///
/// Length differences return early; only the bytes themselves are protected.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

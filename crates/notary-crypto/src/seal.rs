//! # File Sealing (AES-256-GCM)
//!
//! Seals a file and its name into a single authenticated container:
//!
//! ```text
//! container = nonce(12) || AES-256-GCM(key, nonce, plaintext) || tag(16)
//! plaintext = file_name_utf8 || 0x00 || file_bytes
//! ```
//!
//! A fresh 96-bit nonce is drawn from the OS RNG for every call to
//! [`seal()`]. [`open()`] authenticates before returning anything; any
//! altered bit in the nonce, ciphertext or tag yields
//! [`CryptoError::AuthenticationFailed`].

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::CryptoError;
use crate::key::SealingKey;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

const NAME_SEPARATOR: u8 = 0x00;

/// An encrypted container as stored in the blob store.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedPayload(Vec<u8>);

impl SealedPayload {
    /// Wrap container bytes fetched from storage.
    ///
    /// Rejects inputs too short to hold a nonce and a tag. Such inputs cannot
    /// have been produced by [`seal()`], so they are reported as an
    /// authentication failure of the stored object.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::PayloadTooShort(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// The 12-byte nonce prefix.
    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_LEN]
    }

    /// Ciphertext with the trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.0[NONCE_LEN..]
    }

    /// The full container.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the container bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Debug for SealedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealedPayload({} bytes)", self.0.len())
    }
}

/// A successfully opened container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    /// File name embedded at sealing time.
    pub file_name: String,
    /// Original file bytes.
    pub contents: Vec<u8>,
}

fn cipher(key: &SealingKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Seal `contents` under `key`, embedding `file_name`.
///
/// The name must be non-empty and free of NUL bytes, since NUL separates it
/// from the contents inside the plaintext.
pub fn seal(contents: &[u8], file_name: &str, key: &SealingKey) -> Result<SealedPayload, CryptoError> {
    if file_name.is_empty() || file_name.as_bytes().contains(&NAME_SEPARATOR) {
        return Err(CryptoError::InvalidFileName(file_name.escape_debug().to_string()));
    }

    let mut plaintext = Vec::with_capacity(file_name.len() + 1 + contents.len());
    plaintext.extend_from_slice(file_name.as_bytes());
    plaintext.push(NAME_SEPARATOR);
    plaintext.extend_from_slice(contents);

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher(key)
        .encrypt(&nonce, plaintext.as_slice())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    Ok(SealedPayload(out))
}

/// Authenticate and decrypt a container, splitting the plaintext at the
/// first NUL byte into name and contents.
pub fn open(payload: &SealedPayload, key: &SealingKey) -> Result<OpenedFile, CryptoError> {
    let nonce = Nonce::from_slice(payload.nonce());
    let plaintext = cipher(key)
        .decrypt(nonce, payload.ciphertext())
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    let split = plaintext
        .iter()
        .position(|b| *b == NAME_SEPARATOR)
        .ok_or_else(|| CryptoError::MalformedPlaintext("missing name separator".into()))?;
    let file_name = std::str::from_utf8(&plaintext[..split])
        .map_err(|_| CryptoError::MalformedPlaintext("file name is not UTF-8".into()))?
        .to_string();
    let contents = plaintext[split + 1..].to_vec();

    Ok(OpenedFile {
        file_name,
        contents,
    })
}

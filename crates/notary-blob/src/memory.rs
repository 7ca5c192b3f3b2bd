//! In-memory content-addressed blob store.
//!
//! Addresses are the lowercase hex SHA-256 of the stored bytes, so storing
//! the same bytes twice yields the same address. Used when no pinning
//! credentials are configured, and by every test suite that exercises the
//! pipeline end to end.

use std::collections::HashMap;

use async_trait::async_trait;
use notary_core::BlobAddress;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::error::BlobStoreError;
use crate::BlobStore;

/// Thread-safe in-memory blob store.
#[derive(Debug)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobAddress, Vec<u8>>>,
    link_prefix: String,
}

impl MemoryBlobStore {
    /// Create an empty store whose gateway links use `memory://blobs/`.
    pub fn new() -> Self {
        Self::with_link_prefix("memory://blobs/")
    }

    /// Create an empty store with a custom gateway link prefix.
    pub fn with_link_prefix(prefix: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            link_prefix: prefix.into(),
        }
    }

    /// Replace the bytes stored at `address` without changing the address.
    ///
    /// Content addressing normally makes this impossible; it exists to model
    /// a corrupted or malicious storage backend. Returns `false` if nothing
    /// was stored at `address`.
    pub fn overwrite(&self, address: &BlobAddress, bytes: Vec<u8>) -> bool {
        match self.blobs.write().get_mut(address) {
            Some(slot) => {
                *slot = bytes;
                true
            }
            None => false,
        }
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<BlobAddress, BlobStoreError> {
        let address = BlobAddress::new(hex::encode(Sha256::digest(bytes)))?;
        self.blobs
            .write()
            .entry(address.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(address)
    }

    async fn get(&self, address: &BlobAddress) -> Result<Vec<u8>, BlobStoreError> {
        self.blobs
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(address.clone()))
    }

    fn gateway_link(&self, address: &BlobAddress) -> String {
        format!("{}{}", self.link_prefix, address)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

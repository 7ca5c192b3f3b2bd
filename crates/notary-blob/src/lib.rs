//! # notary-blob — Content-Addressed Blob Storage
//!
//! Sealed containers leave the process through the [`BlobStore`] trait. Two
//! implementations are provided:
//!
//! - [`PinataClient`]: pins bytes to IPFS through the Pinata pinning service
//!   and fetches them back through a public gateway.
//! - [`MemoryBlobStore`]: an in-process, content-addressed map used when no
//!   pinning credentials are configured and throughout the test suites.
//!
//! ## Architecture
//!
//! The pipeline depends only on the trait. Retry with exponential backoff on
//! transport failures, throttling and 5xx answers lives inside the HTTP
//! client, never in callers.

pub mod config;
pub mod error;
pub mod memory;
pub mod pinata;
pub(crate) mod retry;

pub use config::{ConfigError, PinataConfig};
pub use error::BlobStoreError;
pub use memory::MemoryBlobStore;
pub use pinata::PinataClient;

use async_trait::async_trait;
use notary_core::BlobAddress;

/// A content-addressed store for opaque byte blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` and return the address under which they can be fetched.
    async fn put(&self, bytes: &[u8]) -> Result<BlobAddress, BlobStoreError>;

    /// Fetch the bytes stored at `address`.
    async fn get(&self, address: &BlobAddress) -> Result<Vec<u8>, BlobStoreError>;

    /// A human-followable link to the blob (gateway URL).
    fn gateway_link(&self, address: &BlobAddress) -> String;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

//! Pipeline stage markers.
//!
//! Each variant names the state a run is *entering*. Errors record the
//! stage that could not be reached, so `BlobStored` on an error means the
//! blob store call failed.

use serde::Serialize;

/// Upload workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    /// Request accepted, key resolved.
    Received,
    /// Fingerprint computed over the plaintext bytes.
    Hashed,
    /// File and name sealed into a container.
    Encrypted,
    /// Container pinned in the blob store.
    BlobStored,
    /// Fingerprint confirmed on the ledger.
    LedgerSubmitted,
    /// Index row persisted.
    Indexed,
    /// Terminal success state.
    Complete,
}

impl UploadStage {
    /// Stable lowercase name for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Hashed => "hashed",
            Self::Encrypted => "encrypted",
            Self::BlobStored => "blob_stored",
            Self::LedgerSubmitted => "ledger_submitted",
            Self::Indexed => "indexed",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verify workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStage {
    /// Request accepted.
    Requested,
    /// `HashStored` event read from the ledger.
    LedgerFetched,
    /// Local index row found.
    IndexLookup,
    /// Sealed container fetched from the blob store.
    BlobFetched,
    /// Container opened (or found not to authenticate).
    Decrypted,
    /// Recomputed fingerprint compared with the ledger value.
    Compared,
}

impl VerifyStage {
    /// Stable lowercase name for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::LedgerFetched => "ledger_fetched",
            Self::IndexLookup => "index_lookup",
            Self::BlobFetched => "blob_fetched",
            Self::Decrypted => "decrypted",
            Self::Compared => "compared",
        }
    }
}

impl std::fmt::Display for VerifyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

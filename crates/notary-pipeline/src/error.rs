//! Pipeline error type.
//!
//! Wraps the collaborator errors together with the stage that failed, so a
//! log line or API error names both what broke and how far the run got.

use notary_blob::BlobStoreError;
use notary_core::{Classify, ErrorKind, TransactionId};
use notary_crypto::CryptoError;
use notary_ledger::LedgerError;
use thiserror::Error;

use crate::index::IndexError;

/// Errors from the upload, verify, and account workflows.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither the request nor the service configuration supplied a key.
    #[error("no sealing key supplied and no default key configured")]
    MissingKey,

    /// A request field is empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Username unknown or password wrong. Deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No account exists with this username.
    #[error("user not found: {0}")]
    UnknownUser(String),

    /// The ledger knows the transaction but the local index does not.
    #[error("no index entry for transaction {0}")]
    IndexEntryMissing(TransactionId),

    /// Sealing or password hashing failed.
    #[error("{stage}: {source}")]
    Crypto {
        /// Stage being entered when the failure occurred.
        stage: &'static str,
        /// Underlying error.
        #[source]
        source: CryptoError,
    },

    /// The blob store failed.
    #[error("{stage}: {source}")]
    BlobStore {
        /// Stage being entered when the failure occurred.
        stage: &'static str,
        /// Underlying error.
        #[source]
        source: BlobStoreError,
    },

    /// The ledger failed.
    #[error("{stage}: {source}")]
    Ledger {
        /// Stage being entered when the failure occurred.
        stage: &'static str,
        /// Underlying error.
        #[source]
        source: LedgerError,
    },

    /// The index store failed.
    #[error("{stage}: {source}")]
    Index {
        /// Stage being entered when the failure occurred.
        stage: &'static str,
        /// Underlying error.
        #[source]
        source: IndexError,
    },

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// The stage recorded on a collaborator failure, if any.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Crypto { stage, .. }
            | Self::BlobStore { stage, .. }
            | Self::Ledger { stage, .. }
            | Self::Index { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl Classify for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKey | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::UnknownUser(_) | Self::IndexEntryMissing(_) => ErrorKind::NotFound,
            Self::Crypto { source, .. } => source.kind(),
            Self::BlobStore { source, .. } => source.kind(),
            Self::Ledger { source, .. } => source.kind(),
            Self::Index { source, .. } => source.kind(),
            Self::Task(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_kind_passes_through() {
        let err = PipelineError::Ledger {
            stage: "ledger_fetched",
            source: LedgerError::EventNotFound(TransactionId::from_hash_bytes(&[0; 32])),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.stage(), Some("ledger_fetched"));
        assert!(err.to_string().starts_with("ledger_fetched: "));
    }

    #[test]
    fn credentials_are_authentication_failures() {
        assert_eq!(PipelineError::InvalidCredentials.kind(), ErrorKind::Authentication);
        assert_eq!(PipelineError::MissingKey.kind(), ErrorKind::Validation);
    }
}

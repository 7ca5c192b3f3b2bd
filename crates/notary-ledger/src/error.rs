//! Ledger error types.

use notary_core::{Classify, ErrorKind, TransactionId};
use thiserror::Error;

/// Errors from ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The hash string to store was empty.
    #[error("hash value must not be empty")]
    EmptyHash,

    /// An account or contract address is not `0x` + 40 hex characters.
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    /// HTTP transport failure talking to the RPC endpoint.
    #[error("RPC transport error calling {method}: {source}")]
    Transport {
        /// JSON-RPC method being called.
        method: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// The RPC endpoint returned a non-2xx HTTP status.
    #[error("RPC endpoint returned HTTP {status} for {method}")]
    HttpStatus {
        /// JSON-RPC method being called.
        method: String,
        /// HTTP status code.
        status: u16,
    },

    /// The node returned a JSON-RPC error object.
    #[error("RPC error from {method} ({code}): {message}")]
    Rpc {
        /// JSON-RPC method being called.
        method: String,
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The node's response did not have the expected shape.
    #[error("malformed response from {method}: {detail}")]
    MalformedResponse {
        /// JSON-RPC method being called.
        method: String,
        /// What was wrong.
        detail: String,
    },

    /// The transaction was mined but reverted.
    #[error("transaction {0} reverted")]
    TransactionFailed(TransactionId),

    /// No receipt appeared before the confirmation timeout elapsed.
    #[error("transaction {transaction_id} not confirmed within {waited_secs}s")]
    ConfirmationTimeout {
        /// The pending transaction.
        transaction_id: TransactionId,
        /// How long the client waited.
        waited_secs: u64,
    },

    /// The ledger has no confirmed transaction with this hash.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction exists but emitted no `HashStored` event.
    #[error("no HashStored event found in transaction {0}")]
    EventNotFound(TransactionId),

    /// Event data could not be ABI-decoded.
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyHash | Self::InvalidAddress(_) => ErrorKind::Validation,
            Self::TransactionNotFound(_) | Self::EventNotFound(_) => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Internal,
            Self::Transport { .. }
            | Self::HttpStatus { .. }
            | Self::Rpc { .. }
            | Self::MalformedResponse { .. }
            | Self::TransactionFailed(_)
            | Self::ConfirmationTimeout { .. }
            | Self::AbiDecode(_) => ErrorKind::Upstream,
        }
    }
}

/// Ledger configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    /// An environment variable holds an unparseable value.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

//! # notary-ledger — Fingerprint Ledger
//!
//! Records fingerprints on an append-only, publicly verifiable ledger and
//! reads them back from the emitted events.
//!
//! ## Contract Interface
//!
//! ```solidity
//! event HashStored(string hash, uint256 timestamp, uint256 index);
//! function storeHash(string memory hash) public;
//! ```
//!
//! ## Implementations
//!
//! - [`EvmLedger`]: JSON-RPC client for an EVM chain. Signing is delegated
//!   to the RPC endpoint (`eth_sendTransaction`), so this crate holds no
//!   private keys. Confirmation waits are bounded by a configurable timeout.
//! - [`MemoryLedger`]: in-process ledger with monotonically increasing block
//!   numbers and sequence indices. Used when no RPC endpoint is configured
//!   and throughout the test suites.

pub mod abi;
pub mod error;
pub mod evm;
pub mod memory;
pub mod types;

pub use error::{ConfigError, LedgerError};
pub use evm::{EvmLedger, EvmLedgerConfig};
pub use memory::MemoryLedger;
pub use types::{LedgerReceipt, LedgerRecord, SigningIdentity};

use async_trait::async_trait;
use notary_core::{ContentFingerprint, TransactionId};

/// An append-only ledger of fingerprint strings.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Submit an arbitrary non-empty hash string and wait for confirmation.
    async fn submit_hash(
        &self,
        hash_value: &str,
        signer: &SigningIdentity,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Read back the `HashStored` event emitted by a confirmed transaction.
    async fn lookup_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<LedgerRecord, LedgerError>;

    /// Human-readable chain name for logs and responses.
    fn chain_name(&self) -> &str;

    /// Submit a content fingerprint in its canonical lowercase hex form.
    async fn submit_fingerprint(
        &self,
        fingerprint: &ContentFingerprint,
        signer: &SigningIdentity,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.submit_hash(&fingerprint.to_hex(), signer).await
    }
}

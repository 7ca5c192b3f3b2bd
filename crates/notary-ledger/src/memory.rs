//! In-memory ledger for development and testing.
//!
//! Behaves like a single-node chain that mines one block per submission:
//! block numbers increase from 1, sequence indices from 0, and every
//! submission (even of an identical string) gets a fresh transaction id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use notary_core::TransactionId;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::error::LedgerError;
use crate::types::{LedgerReceipt, LedgerRecord, SigningIdentity};
use crate::Ledger;

/// Thread-safe in-memory [`Ledger`].
#[derive(Debug)]
pub struct MemoryLedger {
    chain_name: String,
    block_counter: AtomicU64,
    records: RwLock<HashMap<TransactionId, LedgerRecord>>,
}

impl MemoryLedger {
    /// Create an empty ledger with the given chain name.
    pub fn new(chain_name: impl Into<String>) -> Self {
        Self {
            chain_name: chain_name.into(),
            block_counter: AtomicU64::new(0),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of recorded submissions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn submit_hash(
        &self,
        hash_value: &str,
        signer: &SigningIdentity,
    ) -> Result<LedgerReceipt, LedgerError> {
        if hash_value.trim().is_empty() {
            return Err(LedgerError::EmptyHash);
        }

        let block_number = self.block_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut hasher = Sha256::new();
        hasher.update(self.chain_name.as_bytes());
        hasher.update(block_number.to_be_bytes());
        hasher.update(signer.as_str().as_bytes());
        hasher.update(hash_value.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        let transaction_id = TransactionId::from_hash_bytes(&digest);

        let timestamp = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);

        let mut records = self.records.write();
        let sequence_index = records.len() as u64;
        records.insert(
            transaction_id.clone(),
            LedgerRecord {
                transaction_id: transaction_id.clone(),
                fingerprint: hash_value.to_string(),
                timestamp,
                sequence_index,
            },
        );

        tracing::debug!(tx = %transaction_id, block = block_number, "memory ledger recorded hash");
        Ok(LedgerReceipt {
            transaction_id,
            block_number,
            timestamp,
        })
    }

    async fn lookup_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<LedgerRecord, LedgerError> {
        self.records
            .read()
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.clone()))
    }

    fn chain_name(&self) -> &str {
        &self.chain_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_core::sha256_fingerprint;

    fn signer() -> SigningIdentity {
        SigningIdentity::new("0x0000000000000000000000000000000000000002").unwrap()
    }

    #[tokio::test]
    async fn submit_then_lookup_returns_fingerprint() {
        let ledger = MemoryLedger::default();
        let fp = sha256_fingerprint(b"hello");
        let receipt = ledger.submit_fingerprint(&fp, &signer()).await.unwrap();
        let record = ledger.lookup_by_transaction(&receipt.transaction_id).await.unwrap();
        assert_eq!(record.fingerprint, fp.to_hex());
        assert_eq!(record.timestamp, receipt.timestamp);
        assert_eq!(record.sequence_index, 0);
    }

    #[tokio::test]
    async fn identical_submissions_get_distinct_transactions() {
        let ledger = MemoryLedger::default();
        let a = ledger.submit_hash("same", &signer()).await.unwrap();
        let b = ledger.submit_hash("same", &signer()).await.unwrap();
        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(b.block_number, a.block_number + 1);
        let second = ledger.lookup_by_transaction(&b.transaction_id).await.unwrap();
        assert_eq!(second.sequence_index, 1);
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let ledger = MemoryLedger::default();
        let tx = TransactionId::from_hash_bytes(&[9u8; 32]);
        assert!(matches!(
            ledger.lookup_by_transaction(&tx).await,
            Err(LedgerError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_hash_is_rejected() {
        let ledger = MemoryLedger::default();
        assert!(matches!(
            ledger.submit_hash("  ", &signer()).await,
            Err(LedgerError::EmptyHash)
        ));
        assert!(ledger.is_empty());
    }
}

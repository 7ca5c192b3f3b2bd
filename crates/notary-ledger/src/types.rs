//! Ledger-facing value types.

use chrono::{DateTime, Utc};
use notary_core::TransactionId;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// The account on whose behalf ledger transactions are sent
/// (`0x` + 40 hex characters, stored lowercase).
///
/// Signing itself happens at the RPC endpoint; this is only the `from`
/// address of the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SigningIdentity(String);

impl SigningIdentity {
    /// Validate an account address.
    pub fn new(address: impl Into<String>) -> Result<Self, LedgerError> {
        let address = address.into();
        if !is_valid_eth_address(&address) {
            return Err(LedgerError::InvalidAddress(address));
        }
        Ok(Self(address.to_ascii_lowercase()))
    }

    /// The lowercase `0x`-prefixed address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SigningIdentity {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SigningIdentity> for String {
    fn from(value: SigningIdentity) -> Self {
        value.0
    }
}

/// Result of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Hash of the confirmed transaction.
    pub transaction_id: TransactionId,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Block timestamp in Unix seconds.
    pub timestamp: u64,
}

impl LedgerReceipt {
    /// Block timestamp as a UTC datetime.
    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.timestamp)
    }
}

/// A `HashStored` event decoded from a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Hash of the transaction that emitted the event.
    pub transaction_id: TransactionId,
    /// The stored string, exactly as it was submitted.
    pub fingerprint: String,
    /// Contract-reported timestamp in Unix seconds.
    pub timestamp: u64,
    /// Position of this hash in the contract's append-only list.
    pub sequence_index: u64,
}

impl LedgerRecord {
    /// Contract timestamp as a UTC datetime.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.timestamp)
    }
}

fn unix_to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
}

/// Validate that a string is a well-formed Ethereum address (0x + 40 hex chars).
pub(crate) fn is_valid_eth_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

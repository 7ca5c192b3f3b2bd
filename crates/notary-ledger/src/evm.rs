//! # EVM JSON-RPC Ledger
//!
//! Records fingerprints in a `HashStorage` contract on an EVM-compatible
//! chain through JSON-RPC.
//!
//! ## How It Works
//!
//! 1. `storeHash(string)` calldata is sent with `eth_sendTransaction`. The
//!    RPC endpoint signs on behalf of the `from` account.
//! 2. `eth_getTransactionReceipt` is polled until the receipt appears or the
//!    confirmation timeout elapses. A receipt with status `0x0` is a revert.
//! 3. The block timestamp comes from `eth_getBlockByHash`.
//! 4. Lookups fetch the receipt again and decode the `HashStored` log
//!    emitted by the configured contract.
//!
//! ## Security
//!
//! - No private keys are held here. The `from` account must be unlocked or
//!   managed by the RPC provider's signing service, and funded for gas.

use std::time::Duration;

use async_trait::async_trait;
use notary_core::TransactionId;
use serde_json::Value;
use url::Url;

use crate::abi::{self, HASH_STORED_SIGNATURE};
use crate::error::{ConfigError, LedgerError};
use crate::types::{is_valid_eth_address, LedgerReceipt, LedgerRecord, SigningIdentity};
use crate::Ledger;

/// Configuration for the EVM JSON-RPC ledger.
#[derive(Clone)]
pub struct EvmLedgerConfig {
    /// JSON-RPC endpoint URL. May embed a provider key in its path.
    pub rpc_url: Url,
    /// Address of the `HashStorage` contract (0x-prefixed, 40 hex chars).
    pub contract_address: String,
    /// Default sender account.
    pub from_address: String,
    /// Human-readable chain name (e.g., "sepolia", "ethereum").
    pub chain_name: String,
    /// EVM chain ID (e.g., 11155111 for Sepolia).
    pub chain_id: u64,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on the wait for a transaction receipt.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl std::fmt::Debug for EvmLedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Provider URLs commonly carry an API key in the path.
        f.debug_struct("EvmLedgerConfig")
            .field("rpc_host", &self.rpc_url.host_str().unwrap_or("[none]"))
            .field("rpc_url", &"[REDACTED]")
            .field("contract_address", &self.contract_address)
            .field("from_address", &self.from_address)
            .field("chain_name", &self.chain_name)
            .field("chain_id", &self.chain_id)
            .field("request_timeout", &self.request_timeout)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl EvmLedgerConfig {
    /// Create a configuration with defaults for Sepolia.
    ///
    /// Defaults: chain "sepolia" (11155111), 30s request timeout, 120s
    /// confirmation timeout, 2s poll interval.
    pub fn new(rpc_url: Url, contract_address: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            rpc_url,
            contract_address: contract_address.into(),
            from_address: from_address.into(),
            chain_name: "sepolia".to_string(),
            chain_id: 11_155_111,
            request_timeout: Duration::from_secs(30),
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(2000),
        }
    }

    /// Set the chain identity.
    pub fn with_chain(mut self, name: impl Into<String>, chain_id: u64) -> Self {
        self.chain_name = name.into();
        self.chain_id = chain_id;
        self
    }

    /// Set the confirmation wait bound and poll interval.
    pub fn with_confirmation(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LEDGER_RPC_URL` (required)
    /// - `LEDGER_CONTRACT_ADDRESS` (required)
    /// - `LEDGER_FROM_ADDRESS` (required)
    /// - `LEDGER_CHAIN_NAME` (default: `sepolia`)
    /// - `LEDGER_CHAIN_ID` (default: 11155111)
    /// - `LEDGER_TIMEOUT_SECS` (default: 30)
    /// - `LEDGER_CONFIRMATION_TIMEOUT_SECS` (default: 120)
    /// - `LEDGER_POLL_INTERVAL_MS` (default: 2000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("LEDGER_RPC_URL").map_err(|_| ConfigError::MissingVar("LEDGER_RPC_URL"))?;
        let rpc_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidValue("LEDGER_RPC_URL".into(), e.to_string()))?;
        let contract_address = std::env::var("LEDGER_CONTRACT_ADDRESS")
            .map_err(|_| ConfigError::MissingVar("LEDGER_CONTRACT_ADDRESS"))?;
        let from_address = std::env::var("LEDGER_FROM_ADDRESS")
            .map_err(|_| ConfigError::MissingVar("LEDGER_FROM_ADDRESS"))?;

        Ok(Self {
            rpc_url,
            contract_address,
            from_address,
            chain_name: std::env::var("LEDGER_CHAIN_NAME").unwrap_or_else(|_| "sepolia".to_string()),
            chain_id: env_parse("LEDGER_CHAIN_ID", 11_155_111)?,
            request_timeout: Duration::from_secs(env_parse("LEDGER_TIMEOUT_SECS", 30)?),
            confirmation_timeout: Duration::from_secs(env_parse("LEDGER_CONFIRMATION_TIMEOUT_SECS", 120)?),
            poll_interval: Duration::from_millis(env_parse("LEDGER_POLL_INTERVAL_MS", 2000)?),
        })
    }

    /// The configured default sender as a validated identity.
    pub fn signer(&self) -> Result<SigningIdentity, LedgerError> {
        SigningIdentity::new(self.from_address.clone())
    }
}

fn env_parse(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// EVM JSON-RPC implementation of [`Ledger`].
#[derive(Debug)]
pub struct EvmLedger {
    client: reqwest::Client,
    config: EvmLedgerConfig,
    event_topic: String,
}

impl EvmLedger {
    /// Create a new EVM ledger client from configuration.
    pub fn new(config: EvmLedgerConfig) -> Result<Self, LedgerError> {
        if !is_valid_eth_address(&config.contract_address) {
            return Err(LedgerError::InvalidAddress(config.contract_address));
        }
        if !is_valid_eth_address(&config.from_address) {
            return Err(LedgerError::InvalidAddress(config.from_address));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport {
                method: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            client,
            config,
            event_topic: abi::event_topic(HASH_STORED_SIGNATURE),
        })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(self.config.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport {
                method: method.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(LedgerError::HttpStatus {
                method: method.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(|e| LedgerError::MalformedResponse {
            method: method.to_string(),
            detail: format!("invalid JSON: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            return Err(LedgerError::Rpc {
                method: method.to_string(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
            });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::MalformedResponse {
                method: method.to_string(),
                detail: "missing 'result' field".into(),
            })
    }

    async fn get_receipt(&self, tx: &TransactionId) -> Result<Option<Value>, LedgerError> {
        let receipt = self
            .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx.as_str()]))
            .await?;
        Ok(if receipt.is_null() { None } else { Some(receipt) })
    }

    /// Poll for the receipt until it appears or the confirmation timeout
    /// elapses.
    async fn wait_for_receipt(&self, tx: &TransactionId) -> Result<Value, LedgerError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.get_receipt(tx).await? {
                    return Ok::<_, LedgerError>(receipt);
                }
                tracing::debug!(tx = %tx, "receipt not yet available");
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.config.confirmation_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                transaction_id: tx.clone(),
                waited_secs: self.config.confirmation_timeout.as_secs(),
            }),
        }
    }

    async fn block_timestamp(&self, block_hash: &str) -> Result<u64, LedgerError> {
        let method = "eth_getBlockByHash";
        let block = self
            .rpc_call(method, serde_json::json!([block_hash, false]))
            .await?;
        block
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(abi::parse_quantity)
            .ok_or_else(|| LedgerError::MalformedResponse {
                method: method.into(),
                detail: "block missing 'timestamp'".into(),
            })
    }

    fn is_hash_stored_log(&self, log: &Value) -> bool {
        let from_contract = log
            .get("address")
            .and_then(Value::as_str)
            .is_some_and(|a| a.eq_ignore_ascii_case(&self.config.contract_address));
        let topic_matches = log
            .get("topics")
            .and_then(Value::as_array)
            .and_then(|t| t.first())
            .and_then(Value::as_str)
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.event_topic));
        from_contract && topic_matches
    }
}

fn receipt_field<'a>(receipt: &'a Value, field: &str) -> Result<&'a str, LedgerError> {
    receipt
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LedgerError::MalformedResponse {
            method: "eth_getTransactionReceipt".into(),
            detail: format!("receipt missing '{field}'"),
        })
}

#[async_trait]
impl Ledger for EvmLedger {
    async fn submit_hash(
        &self,
        hash_value: &str,
        signer: &SigningIdentity,
    ) -> Result<LedgerReceipt, LedgerError> {
        if hash_value.trim().is_empty() {
            return Err(LedgerError::EmptyHash);
        }

        let tx = serde_json::json!({
            "from": signer.as_str(),
            "to": self.config.contract_address,
            "data": abi::encode_store_hash(hash_value),
        });
        let method = "eth_sendTransaction";
        let result = self.rpc_call(method, serde_json::json!([tx])).await?;
        let raw_hash = result.as_str().ok_or_else(|| LedgerError::MalformedResponse {
            method: method.into(),
            detail: "non-string transaction hash".into(),
        })?;
        let transaction_id =
            TransactionId::new(raw_hash).map_err(|e| LedgerError::MalformedResponse {
                method: method.into(),
                detail: e.to_string(),
            })?;
        tracing::info!(tx = %transaction_id, chain = %self.config.chain_name, "ledger transaction sent");

        let receipt = self.wait_for_receipt(&transaction_id).await?;
        if receipt_field(&receipt, "status")? == "0x0" {
            return Err(LedgerError::TransactionFailed(transaction_id));
        }
        let block_number = abi::parse_quantity(receipt_field(&receipt, "blockNumber")?).ok_or_else(|| {
            LedgerError::MalformedResponse {
                method: "eth_getTransactionReceipt".into(),
                detail: "unparseable 'blockNumber'".into(),
            }
        })?;
        let timestamp = self.block_timestamp(receipt_field(&receipt, "blockHash")?).await?;

        tracing::info!(tx = %transaction_id, block = block_number, "ledger transaction confirmed");
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
        let receipt = self
            .get_receipt(transaction_id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.clone()))?;

        let log = receipt
            .get("logs")
            .and_then(Value::as_array)
            .and_then(|logs| logs.iter().find(|log| self.is_hash_stored_log(log)))
            .ok_or_else(|| LedgerError::EventNotFound(transaction_id.clone()))?;

        let data = log.get("data").and_then(Value::as_str).unwrap_or("0x");
        let event = abi::decode_hash_stored(data)?;

        Ok(LedgerRecord {
            transaction_id: transaction_id.clone(),
            fingerprint: event.hash,
            timestamp: event.timestamp,
            sequence_index: event.index,
        })
    }

    fn chain_name(&self) -> &str {
        &self.config.chain_name
    }
}

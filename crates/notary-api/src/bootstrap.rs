//! # Service Bootstrap
//!
//! Assembles the [`Notary`] pipeline from the environment at startup.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Blob store**: Pinata client when `PINATA_API_KEY` is set, otherwise
//!    the in-memory store.
//! 2. **Ledger**: EVM JSON-RPC client when `LEDGER_RPC_URL` is set,
//!    otherwise the in-memory ledger with a placeholder signer.
//! 3. **Index**: Postgres when a pool was opened, otherwise in-memory.
//! 4. **Log identity**: one structured startup line naming each backend.
//!
//! A missing variable selects the in-memory fallback with a warning. A
//! variable that is present but malformed aborts startup.

use std::sync::Arc;

use notary_blob::{BlobStore, MemoryBlobStore, PinataClient, PinataConfig};
use notary_ledger::{EvmLedger, EvmLedgerConfig, Ledger, MemoryLedger, SigningIdentity};
use notary_pipeline::{IndexStore, MemoryIndex, Notary, NotarySettings};
use sqlx::PgPool;

use crate::db::PgIndexStore;
use crate::state::{dev_signer, AppConfig, AppState};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Pinata configuration present but invalid, or client construction failed.
    #[error("blob store: {0}")]
    BlobStore(String),

    /// Ledger configuration present but invalid.
    #[error("ledger: {0}")]
    Ledger(String),
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Build the blob store from `PINATA_*` variables.
pub fn blob_store_from_env() -> Result<Arc<dyn BlobStore>, BootstrapError> {
    match PinataConfig::from_env() {
        Ok(config) => {
            tracing::info!(base_url = %config.base_url, "Pinata blob store configured");
            let client = PinataClient::new(config).map_err(|e| BootstrapError::BlobStore(e.to_string()))?;
            Ok(Arc::new(client))
        }
        Err(notary_blob::ConfigError::MissingVar(var)) => {
            tracing::warn!(
                missing = var,
                "Pinata not configured, using the in-memory blob store. Sealed files will not survive restarts."
            );
            Ok(Arc::new(MemoryBlobStore::new()))
        }
        Err(e) => Err(BootstrapError::BlobStore(e.to_string())),
    }
}

/// Build the ledger and its signing identity from `LEDGER_*` variables.
pub fn ledger_from_env() -> Result<(Arc<dyn Ledger>, SigningIdentity), BootstrapError> {
    match EvmLedgerConfig::from_env() {
        Ok(config) => {
            let signer = config.signer().map_err(|e| BootstrapError::Ledger(e.to_string()))?;
            tracing::info!(
                chain = %config.chain_name,
                chain_id = config.chain_id,
                contract = %config.contract_address,
                "EVM ledger configured"
            );
            let ledger = EvmLedger::new(config).map_err(|e| BootstrapError::Ledger(e.to_string()))?;
            Ok((Arc::new(ledger), signer))
        }
        Err(notary_ledger::ConfigError::MissingVar(var)) => {
            tracing::warn!(
                missing = var,
                "EVM ledger not configured, using the in-memory ledger. Notarizations are not anchored on any chain."
            );
            let signer = dev_signer().map_err(|e| BootstrapError::Ledger(e.to_string()))?;
            Ok((Arc::new(MemoryLedger::default()), signer))
        }
        Err(e) => Err(BootstrapError::Ledger(e.to_string())),
    }
}

/// Postgres index when a pool is available, otherwise in-memory.
pub fn index_store(pool: Option<PgPool>) -> Arc<dyn IndexStore> {
    match pool {
        Some(pool) => Arc::new(PgIndexStore::new(pool)),
        None => Arc::new(MemoryIndex::new()),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Assemble the application state from configuration and the environment.
pub fn bootstrap(config: &AppConfig, pool: Option<PgPool>) -> Result<AppState, BootstrapError> {
    let blobs = blob_store_from_env()?;
    let (ledger, signer) = ledger_from_env()?;
    let index = index_store(pool);

    if config.default_key.is_none() {
        tracing::info!("no default sealing key configured; requests must supply one");
    }

    tracing::info!(
        blob_store = blobs.backend_name(),
        ledger = ledger.chain_name(),
        signer = %signer,
        admin_enabled = config.admin_token.is_some(),
        cors = ?config.cors_origins,
        "notary service bootstrapped"
    );

    let settings = NotarySettings {
        signer,
        default_key: config.default_key.clone(),
        explorer_base_url: config.explorer_base_url.clone(),
    };
    let notary = Notary::new(blobs, ledger, index, settings);
    Ok(AppState::new(Arc::new(notary), config.admin_token.clone()).with_cors(config.cors_origins.clone()))
}

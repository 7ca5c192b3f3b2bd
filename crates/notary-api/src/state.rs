//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The state is deliberately thin: the [`Notary`] pipeline owns the blob
//! store, ledger, and index collaborators, and the handlers only translate
//! between HTTP and pipeline calls.

use std::sync::Arc;

use notary_blob::MemoryBlobStore;
use notary_crypto::SealingKey;
use notary_ledger::{LedgerError, MemoryLedger, SigningIdentity};
use notary_pipeline::{MemoryIndex, Notary, NotarySettings};

use crate::auth::{AdminAuth, SecretToken};
use crate::middleware::cors::CorsOrigins;
use crate::middleware::metrics::ApiMetrics;

/// Default block explorer prefix (Sepolia Etherscan).
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io/tx/";

/// Signer used when no EVM ledger is configured.
pub const DEV_SIGNER: &str = "0x00000000000000000000000000000000000d0e0f";

// -- Configuration ------------------------------------------------------------

/// Errors reading the service configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Service-level configuration. Collaborator configuration (Pinata, EVM
/// ledger, database) is read by their own `from_env` constructors.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bearer token for `/admin/*`. `None` disables those routes.
    pub admin_token: Option<SecretToken>,
    /// Key used when an upload or verify request carries none.
    pub default_key: Option<SealingKey>,
    /// Prefix joined with a transaction hash to form an explorer link.
    pub explorer_base_url: String,
    /// Browser origins allowed by the CORS layer.
    pub cors_origins: CorsOrigins,
}

impl AppConfig {
    /// Read `PORT`, `NOTARY_ADMIN_TOKEN`, `NOTARY_SEALING_KEY`,
    /// `NOTARY_EXPLORER_URL` and `NOTARY_CORS_ORIGINS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            Err(_) => 8080,
        };
        let admin_token = std::env::var("NOTARY_ADMIN_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretToken::new);
        let default_key = match std::env::var("NOTARY_SEALING_KEY") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                SealingKey::from_hex(&raw)
                    .map_err(|e| ConfigError::InvalidValue("NOTARY_SEALING_KEY", e.to_string()))?,
            ),
            _ => None,
        };
        let explorer_base_url = std::env::var("NOTARY_EXPLORER_URL")
            .unwrap_or_else(|_| DEFAULT_EXPLORER_URL.to_string());
        let cors_origins = match std::env::var("NOTARY_CORS_ORIGINS") {
            Ok(raw) => CorsOrigins::parse(&raw)
                .map_err(|bad| ConfigError::InvalidValue("NOTARY_CORS_ORIGINS", bad))?,
            Err(_) => CorsOrigins::Any,
        };

        Ok(Self {
            port,
            admin_token,
            default_key,
            explorer_base_url,
            cors_origins,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[REDACTED]"))
            .field("default_key", &self.default_key.as_ref().map(|_| "[REDACTED]"))
            .field("explorer_base_url", &self.explorer_base_url)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            admin_token: None,
            default_key: None,
            explorer_base_url: DEFAULT_EXPLORER_URL.to_string(),
            cors_origins: CorsOrigins::Any,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub notary: Arc<Notary>,
    pub admin: AdminAuth,
    pub metrics: ApiMetrics,
    pub cors: CorsOrigins,
}

impl AppState {
    /// Wrap an assembled pipeline. CORS allows any origin until
    /// [`with_cors`](Self::with_cors) narrows it.
    pub fn new(notary: Arc<Notary>, admin_token: Option<SecretToken>) -> Self {
        Self {
            notary,
            admin: AdminAuth { token: admin_token },
            metrics: ApiMetrics::new(),
            cors: CorsOrigins::Any,
        }
    }

    /// Replace the allowed browser origins.
    pub fn with_cors(mut self, origins: CorsOrigins) -> Self {
        self.cors = origins;
        self
    }

    /// A fully in-memory service: memory blob store, ledger and index.
    /// Used for local development and tests.
    pub fn in_memory(config: &AppConfig) -> Result<Self, LedgerError> {
        let settings = NotarySettings {
            signer: dev_signer()?,
            default_key: config.default_key.clone(),
            explorer_base_url: config.explorer_base_url.clone(),
        };
        let notary = Notary::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemoryLedger::default()),
            Arc::new(MemoryIndex::new()),
            settings,
        );
        Ok(Self::new(Arc::new(notary), config.admin_token.clone()).with_cors(config.cors_origins.clone()))
    }
}

/// The placeholder signer used with the in-memory ledger.
pub fn dev_signer() -> Result<SigningIdentity, LedgerError> {
    SigningIdentity::new(DEV_SIGNER)
}

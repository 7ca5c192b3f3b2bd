//! Pinata pinning-service configuration.
//!
//! Defaults point at the public Pinata API and gateway. Override via
//! environment variables or explicit construction for testing.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for the Pinata pinning service.
///
/// Custom `Debug` implementation redacts both credentials.
#[derive(Clone)]
pub struct PinataConfig {
    /// Base URL of the pinning API. Default: <https://api.pinata.cloud>
    pub base_url: Url,
    /// Gateway prefix for fetching pinned content. Must end with `/`.
    /// Default: <https://gateway.pinata.cloud/ipfs/>
    pub gateway_url: Url,
    /// Value of the `pinata_api_key` header.
    pub api_key: Zeroizing<String>,
    /// Value of the `pinata_secret_api_key` header.
    pub secret_api_key: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a failed first attempt (connect error, timeout, 429, 5xx).
    pub max_retries: u32,
    /// Wait before the first retry in milliseconds, doubled per retry.
    pub retry_base_delay_ms: u64,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("base_url", &self.base_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &"[REDACTED]")
            .field("secret_api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl PinataConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PINATA_API_KEY` (required)
    /// - `PINATA_SECRET_API_KEY` (required)
    /// - `PINATA_BASE_URL` (default: `https://api.pinata.cloud`)
    /// - `PINATA_GATEWAY_URL` (default: `https://gateway.pinata.cloud/ipfs/`)
    /// - `PINATA_TIMEOUT_SECS` (default: 30)
    /// - `PINATA_MAX_RETRIES` (default: 3)
    /// - `PINATA_RETRY_BASE_DELAY_MS` (default: 200)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("PINATA_API_KEY")
            .map_err(|_| ConfigError::MissingVar("PINATA_API_KEY"))?;
        let secret_api_key = std::env::var("PINATA_SECRET_API_KEY")
            .map_err(|_| ConfigError::MissingVar("PINATA_SECRET_API_KEY"))?;

        Ok(Self {
            base_url: env_url("PINATA_BASE_URL", "https://api.pinata.cloud")?,
            gateway_url: with_trailing_slash(env_url(
                "PINATA_GATEWAY_URL",
                "https://gateway.pinata.cloud/ipfs/",
            )?),
            api_key: Zeroizing::new(api_key),
            secret_api_key: Zeroizing::new(secret_api_key),
            timeout_secs: env_number("PINATA_TIMEOUT_SECS", 30),
            max_retries: env_number("PINATA_MAX_RETRIES", 3),
            retry_base_delay_ms: env_number("PINATA_RETRY_BASE_DELAY_MS", 200),
        })
    }

    /// Create a configuration pointing both API and gateway at a local mock
    /// server (for testing). The gateway lives under `/ipfs/`.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        let parse = |raw: String| {
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl("local_mock".to_string(), e.to_string()))
        };
        Ok(Self {
            base_url: parse(base.to_string())?,
            gateway_url: parse(format!("{}/ipfs/", base.trim_end_matches('/')))?,
            api_key: Zeroizing::new("test-key".into()),
            secret_api_key: Zeroizing::new("test-secret".into()),
            timeout_secs: 5,
            max_retries: 3,
            retry_base_delay_ms: 10,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

// Url::join drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

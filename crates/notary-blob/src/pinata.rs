//! Typed client for the Pinata pinning service.
//!
//! - Upload: `POST {base_url}/pinning/pinFileToIPFS`, multipart field `file`,
//!   authenticated with the `pinata_api_key` / `pinata_secret_api_key`
//!   headers. The response carries the CID as `IpfsHash`.
//! - Download: `GET {gateway_url}{cid}` (public gateway, no credentials).

use std::time::Duration;

use async_trait::async_trait;
use notary_core::BlobAddress;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::config::{ConfigError, PinataConfig};
use crate::error::BlobStoreError;
use crate::retry::Backoff;
use crate::BlobStore;

/// File name attached to the multipart part. Pinata records it as pin
/// metadata only; the real name is sealed inside the container.
const UPLOAD_FILE_NAME: &str = "sealed.bin";

// -- Types matching the Pinata API schema -------------------------------------

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

// -- Client -------------------------------------------------------------------

/// Client for the Pinata pinning API and its IPFS gateway.
#[derive(Debug, Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    base_url: Url,
    gateway_url: Url,
    backoff: Backoff,
}

impl PinataClient {
    /// Create a client from configuration.
    pub fn new(config: PinataConfig) -> Result<Self, BlobStoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "pinata_api_key",
            HeaderValue::from_str(config.api_key.as_str())
                .map_err(|_| BlobStoreError::Config(ConfigError::MissingVar("PINATA_API_KEY")))?,
        );
        let mut secret = HeaderValue::from_str(config.secret_api_key.as_str()).map_err(|_| {
            BlobStoreError::Config(ConfigError::MissingVar("PINATA_SECRET_API_KEY"))
        })?;
        secret.set_sensitive(true);
        headers.insert("pinata_secret_api_key", secret);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BlobStoreError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            gateway_url: config.gateway_url,
            backoff: Backoff {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.retry_base_delay_ms),
            },
        })
    }

    fn gateway_url_for(&self, address: &BlobAddress) -> String {
        format!("{}{}", self.gateway_url, address)
    }
}

#[async_trait]
impl BlobStore for PinataClient {
    async fn put(&self, bytes: &[u8]) -> Result<BlobAddress, BlobStoreError> {
        let endpoint = "POST /pinning/pinFileToIPFS";
        let url = format!(
            "{}/pinning/pinFileToIPFS",
            self.base_url.as_str().trim_end_matches('/')
        );

        let resp = self
            .backoff
            .send(endpoint, || {
                let part = Part::bytes(bytes.to_vec()).file_name(UPLOAD_FILE_NAME);
                self.http
                    .post(&url)
                    .multipart(Form::new().part("file", part))
                    .send()
            })
            .await
            .map_err(|e| BlobStoreError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobStoreError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let pinned: PinFileResponse =
            resp.json().await.map_err(|e| BlobStoreError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let address = BlobAddress::new(pinned.ipfs_hash)?;
        tracing::debug!(cid = %address, size = bytes.len(), "pinned blob");
        Ok(address)
    }

    async fn get(&self, address: &BlobAddress) -> Result<Vec<u8>, BlobStoreError> {
        let endpoint = "GET /ipfs/{cid}";
        let url = self.gateway_url_for(address);

        let resp = self
            .backoff
            .send(endpoint, || self.http.get(&url).send())
            .await
            .map_err(|e| BlobStoreError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobStoreError::NotFound(address.clone()));
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobStoreError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| BlobStoreError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    fn gateway_link(&self, address: &BlobAddress) -> String {
        self.gateway_url_for(address)
    }

    fn backend_name(&self) -> &'static str {
        "pinata"
    }
}

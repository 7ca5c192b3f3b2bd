//! # Cross-Origin Resource Sharing
//!
//! Browser front ends call the API from another origin. `NOTARY_CORS_ORIGINS`
//! selects who may: unset or `*` allows any origin, otherwise a
//! comma-separated list of exact origins.

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::extractors::SEALING_KEY_HEADER;

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`Access-Control-Allow-Origin: *`).
    #[default]
    Any,
    /// Only these origins.
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse the `NOTARY_CORS_ORIGINS` format. Returns the offending entry
    /// when one is not a valid header value.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| HeaderValue::from_str(s).map_err(|_| s.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        if origins.is_empty() {
            return Ok(Self::Any);
        }
        Ok(Self::List(origins))
    }
}

/// Build the CORS layer for the configured origins.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SEALING_KEY_HEADER),
        ])
}

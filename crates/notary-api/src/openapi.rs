//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notary API",
        version = "0.3.0",
        description = "File integrity notarization: SHA-256 fingerprints anchored on an EVM ledger, AES-256-GCM sealed copies pinned to IPFS, and a local index correlating the two.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Notarization
        crate::routes::notarize::upload,
        crate::routes::notarize::verify,
        // Accounts
        crate::routes::users::register,
        crate::routes::users::list_transactions,
        // Ledger
        crate::routes::ledger::store_hash,
        crate::routes::ledger::lookup_hash,
        // Admin
        crate::routes::admin::reset,
        crate::routes::admin::metrics,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::notarize::UploadForm,
        crate::routes::notarize::UploadResponse,
        crate::routes::notarize::VerifyResponse,
        crate::routes::users::RegisterRequest,
        crate::routes::users::RegisterResponse,
        crate::routes::users::TransactionView,
        crate::routes::ledger::StoreHashRequest,
        crate::routes::ledger::StoreHashResponse,
        crate::routes::ledger::LedgerRecordResponse,
        crate::routes::admin::ResetResponse,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "notarization", description = "Upload and verify files"),
        (name = "accounts", description = "Registration and per-user listings"),
        (name = "ledger", description = "Direct hash-storage contract access"),
        (name = "admin", description = "Administrative operations (bearer token)"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the admin routes.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/upload",
            "/verify/{tx}",
            "/register",
            "/transactions/{username}",
            "/ledger/hashes",
            "/ledger/hashes/{tx}",
            "/admin/reset",
            "/admin/metrics",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}

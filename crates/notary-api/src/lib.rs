//! # notary-api — HTTP Service for the Notary Stack
//!
//! Exposes the notarization pipeline over HTTP.
//!
//! ## API Surface
//!
//! | Route                          | Module                    | Purpose                         |
//! |--------------------------------|---------------------------|---------------------------------|
//! | `POST /upload`                 | [`routes::notarize`]      | Hash, seal, store, notarize     |
//! | `GET /verify/:tx`              | [`routes::notarize`]      | Recompute and compare           |
//! | `POST /register`               | [`routes::users`]         | Create an account               |
//! | `GET /transactions/:username`  | [`routes::users`]         | List a user's uploads           |
//! | `POST /ledger/hashes`          | [`routes::ledger`]        | Store a raw hash                |
//! | `GET /ledger/hashes/:tx`       | [`routes::ledger`]        | Read a stored hash              |
//! | `POST /admin/reset`            | [`routes::admin`]         | Clear the index (bearer token)  |
//! | `GET /admin/metrics`           | [`routes::admin`]         | Counters (bearer token)         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → [AdminAuth on /admin/*] → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated by utoipa derive macros, served at `/openapi.json`.

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use notary_pipeline::IndexStore;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the metrics middleware
/// so orchestrator polling does not inflate the request counters. CORS
/// wraps everything, so preflight requests never reach a handler.
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors::cors_layer(&state.cors);

    let api = Router::new()
        .merge(routes::notarize::router())
        .merge(routes::users::router())
        .merge(routes::ledger::router())
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(state.admin.clone()))
        .layer(axum::Extension(state.metrics.clone()))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api).layer(cors)
}

/// Liveness probe. Always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. 200 when the index store answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.notary.index().ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "index unavailable")
        }
    }
}

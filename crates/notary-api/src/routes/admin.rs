//! # Administrative API
//!
//! Bulk index reset and counters, behind the admin bearer token (see
//! [`crate::auth`]).

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::admin_middleware;
use crate::error::AppError;
use crate::middleware::metrics::MetricsSnapshot;
use crate::state::AppState;

/// Outcome of an index reset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    /// Number of index entries deleted.
    pub removed: u64,
}

/// Build the admin router. Every route requires the admin token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/reset", post(reset))
        .route("/admin/metrics", get(metrics))
        .route_layer(from_fn(admin_middleware))
}

/// POST /admin/reset: delete every index entry.
///
/// Users, sealed blobs and ledger records are untouched.
#[utoipa::path(
    post,
    path = "/admin/reset",
    responses(
        (status = 200, description = "Index cleared", body = ResetResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
        (status = 403, description = "Admin endpoints disabled", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn reset(State(state): State<AppState>) -> Result<Json<ResetResponse>, AppError> {
    let removed = state.notary.reset_index().await?;
    Ok(Json(ResetResponse { removed }))
}

/// GET /admin/metrics: request and notarization counters.
#[utoipa::path(
    get,
    path = "/admin/metrics",
    responses(
        (status = 200, description = "Current counters", body = MetricsSnapshot),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

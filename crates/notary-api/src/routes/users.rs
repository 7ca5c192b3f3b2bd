//! # Accounts API
//!
//! Registration and the per-user transaction listing.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use notary_pipeline::IndexEntry;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── DTOs ────────────────────────────────────────────────────────────

/// Request to create an account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

/// A newly created account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
}

/// One notarized upload, as listed for its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionView {
    pub id: i64,
    pub transaction_id: String,
    pub file_name: String,
    pub file_hash: String,
    pub explorer_url: String,
    pub blob_address: String,
    pub created_at: DateTime<Utc>,
}

impl From<IndexEntry> for TransactionView {
    fn from(entry: IndexEntry) -> Self {
        Self {
            id: entry.id.0,
            transaction_id: entry.transaction_id.to_string(),
            file_name: entry.file_name,
            file_hash: entry.fingerprint.to_hex(),
            explorer_url: entry.explorer_link,
            blob_address: entry.blob_address.to_string(),
            created_at: entry.created_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the accounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/transactions/:username", get(list_transactions))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /register: Create an account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 409, description = "Username taken", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid username or password", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let user = state.notary.register(&req.username, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.0,
            username: user.username,
        }),
    ))
}

/// GET /transactions/:username: List a user's notarized uploads, newest first.
#[utoipa::path(
    get,
    path = "/transactions/{username}",
    params(("username" = String, Path, description = "Account name")),
    responses(
        (status = 200, description = "Uploads owned by the user", body = Vec<TransactionView>),
        (status = 404, description = "Unknown user", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<TransactionView>>, AppError> {
    let entries = state.notary.list_transactions(&username).await?;
    Ok(Json(entries.into_iter().map(TransactionView::from).collect()))
}

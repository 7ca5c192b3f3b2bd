//! # Ledger API
//!
//! Direct access to the hash-storage contract, bypassing the blob store and
//! the index: submit an arbitrary hash string, or read back the
//! `HashStored` event a transaction emitted.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use notary_core::TransactionId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Longest hash string accepted for direct submission.
const MAX_HASH_VALUE_LEN: usize = 256;

/// Request to store a hash on the ledger.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreHashRequest {
    pub hash_value: String,
}

impl Validate for StoreHashRequest {
    fn validate(&self) -> Result<(), String> {
        if self.hash_value.trim().is_empty() {
            return Err("hash_value must not be empty".to_string());
        }
        if self.hash_value.len() > MAX_HASH_VALUE_LEN {
            return Err(format!(
                "hash_value must not exceed {MAX_HASH_VALUE_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// A confirmed ledger submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreHashResponse {
    pub tx_hash: String,
    pub block_number: u64,
    /// Block timestamp, Unix seconds.
    pub timestamp: u64,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// The `HashStored` event of a transaction.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerRecordResponse {
    pub tx_hash: String,
    pub hash: String,
    /// Contract timestamp, Unix seconds.
    pub timestamp: u64,
    /// Position of the record in the contract's list.
    pub index: u64,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Build the ledger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ledger/hashes", post(store_hash))
        .route("/ledger/hashes/:tx", get(lookup_hash))
}

/// POST /ledger/hashes: store a hash string and wait for confirmation.
#[utoipa::path(
    post,
    path = "/ledger/hashes",
    request_body = StoreHashRequest,
    responses(
        (status = 201, description = "Hash stored and confirmed", body = StoreHashResponse),
        (status = 422, description = "Empty or oversized hash", body = crate::error::ErrorBody),
        (status = 502, description = "Ledger failure or confirmation timeout", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn store_hash(
    State(state): State<AppState>,
    body: Result<Json<StoreHashRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreHashResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let receipt = state.notary.store_hash(&req.hash_value).await?;
    tracing::info!(tx = %receipt.transaction_id, "raw hash stored");
    Ok((
        StatusCode::CREATED,
        Json(StoreHashResponse {
            tx_hash: receipt.transaction_id.to_string(),
            block_number: receipt.block_number,
            timestamp: receipt.timestamp,
            confirmed_at: receipt.confirmed_at(),
        }),
    ))
}

/// GET /ledger/hashes/:tx: read the stored hash of a transaction.
#[utoipa::path(
    get,
    path = "/ledger/hashes/{tx}",
    params(("tx" = String, Path, description = "Ledger transaction hash")),
    responses(
        (status = 200, description = "Event found", body = LedgerRecordResponse),
        (status = 404, description = "Transaction or event not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed transaction hash", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn lookup_hash(
    State(state): State<AppState>,
    Path(tx): Path<String>,
) -> Result<Json<LedgerRecordResponse>, AppError> {
    let transaction_id = TransactionId::new(tx)?;
    let record = state.notary.lookup_hash(&transaction_id).await?;
    Ok(Json(LedgerRecordResponse {
        tx_hash: record.transaction_id.to_string(),
        recorded_at: record.recorded_at(),
        hash: record.fingerprint,
        timestamp: record.timestamp,
        index: record.sequence_index,
    }))
}

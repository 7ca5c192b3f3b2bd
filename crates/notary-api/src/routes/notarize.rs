//! # Notarization API
//!
//! The two workflows the service exists for:
//!
//! - `POST /upload` authenticates the caller, then hashes, seals, stores,
//!   notarizes and indexes one file.
//! - `GET /verify/:tx` re-derives the fingerprint of a notarized file from
//!   its stored container and compares it with the ledger.
//!
//! Upload is a `multipart/form-data` request with the fields `username`,
//! `password`, `file` (with a filename) and an optional hex `key`. Verify
//! takes its key from the `X-Sealing-Key` header. Both fall back to the
//! service's default key when none is supplied.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use notary_core::TransactionId;
use notary_pipeline::{MismatchReason, UploadReceipt, UploadRequest, Verdict, VerifyReport};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::extractors::{parse_sealing_key, sealing_key_from_headers};
use crate::state::AppState;

/// Largest accepted upload request, multipart framing included.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// ── DTOs ────────────────────────────────────────────────────────────

/// Multipart form accepted by `POST /upload`. Documentation only; the
/// handler reads the parts as a stream.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    username: String,
    password: String,
    /// The file to notarize. Its filename is sealed with the contents.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// 64 hex characters. Optional when the service has a default key.
    key: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: i64,
    pub file_name: String,
    /// SHA-256 of the file bytes, 64 lowercase hex characters.
    pub file_hash: String,
    pub transaction_id: String,
    pub block_number: u64,
    /// Ledger confirmation time, Unix seconds.
    pub timestamp: u64,
    pub explorer_url: String,
    pub blob_address: String,
    pub blob_link: String,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            id: receipt.entry_id.0,
            file_name: receipt.file_name,
            file_hash: receipt.fingerprint.to_hex(),
            transaction_id: receipt.transaction_id.to_string(),
            block_number: receipt.block_number,
            timestamp: receipt.timestamp,
            explorer_url: receipt.explorer_url,
            blob_address: receipt.blob_address.to_string(),
            blob_link: receipt.blob_link,
        }
    }
}

/// Query parameters of `GET /verify/:tx`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    /// When true, a mismatch is returned as 409 INTEGRITY_MISMATCH instead
    /// of a 200 report.
    #[serde(default)]
    pub strict: bool,
}

/// Verification report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub transaction_id: String,
    /// `match` or `mismatch`.
    pub verdict: String,
    /// Set on mismatch: `digest_differs` or `undecryptable`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Fingerprint recorded on the ledger.
    pub ledger_hash: String,
    /// Fingerprint of the decrypted contents, absent if the container did not open.
    pub recomputed_hash: Option<String>,
    pub file_name: Option<String>,
    /// Ledger timestamp, Unix seconds.
    pub timestamp: u64,
    pub recorded_at: Option<DateTime<Utc>>,
    pub sequence_index: u64,
    pub blob_address: String,
    pub blob_link: String,
}

impl From<VerifyReport> for VerifyResponse {
    fn from(report: VerifyReport) -> Self {
        let (verdict, reason) = match report.verdict {
            Verdict::Match => ("match", None),
            Verdict::Mismatch(MismatchReason::DigestDiffers) => ("mismatch", Some("digest_differs")),
            Verdict::Mismatch(MismatchReason::Undecryptable) => ("mismatch", Some("undecryptable")),
        };
        Self {
            transaction_id: report.transaction_id.to_string(),
            verdict: verdict.to_string(),
            reason: reason.map(str::to_string),
            ledger_hash: report.ledger_fingerprint,
            recomputed_hash: report.recomputed.map(|fp| fp.to_hex()),
            file_name: report.file_name,
            timestamp: report.ledger_timestamp,
            recorded_at: i64::try_from(report.ledger_timestamp)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            sequence_index: report.sequence_index,
            blob_address: report.blob_address.to_string(),
            blob_link: report.blob_link,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the notarization router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/verify/:tx", get(verify))
}

// ── Multipart parsing ───────────────────────────────────────────────

#[derive(Default)]
struct UploadFields {
    username: Option<String>,
    password: Option<String>,
    key: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

/// Strip any directory components a client left in the filename.
fn base_name(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw)
}

async fn read_upload_fields(mut multipart: Multipart) -> Result<UploadFields, AppError> {
    let malformed = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => fields.username = Some(field.text().await.map_err(malformed)?),
            "password" => fields.password = Some(field.text().await.map_err(malformed)?),
            "key" => fields.key = Some(field.text().await.map_err(malformed)?),
            "file" => {
                let file_name = field
                    .file_name()
                    .map(|n| base_name(n).to_string())
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AppError::Validation("file part must carry a filename".into()))?;
                let bytes = field.bytes().await.map_err(malformed)?;
                fields.file = Some((file_name, bytes.to_vec()));
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok(fields)
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /upload: Notarize a file.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File notarized", body = UploadResponse),
        (status = 400, description = "Malformed multipart body", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid username or password", body = crate::error::ErrorBody),
        (status = 422, description = "Missing field or malformed key", body = crate::error::ErrorBody),
        (status = 502, description = "Blob store or ledger failure", body = crate::error::ErrorBody),
    ),
    tag = "notarization"
)]
pub(crate) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let fields = read_upload_fields(multipart).await?;

    let username = fields
        .username
        .ok_or_else(|| AppError::Validation("missing field: username".into()))?;
    let password = fields
        .password
        .ok_or_else(|| AppError::Validation("missing field: password".into()))?;
    let (file_name, contents) = fields
        .file
        .ok_or_else(|| AppError::Validation("missing field: file".into()))?;
    let key = parse_sealing_key(fields.key.as_deref())?;

    let user = state.notary.authenticate(&username, &password).await?;
    let receipt = state
        .notary
        .upload(UploadRequest {
            owner: user.id,
            file_name,
            contents,
            key,
        })
        .await?;
    state.metrics.record_upload();

    Ok((StatusCode::CREATED, Json(UploadResponse::from(receipt))))
}

/// GET /verify/:tx: Verify a notarized file against the ledger.
#[utoipa::path(
    get,
    path = "/verify/{tx}",
    params(
        ("tx" = String, Path, description = "Ledger transaction hash"),
        ("x-sealing-key" = Option<String>, Header, description = "Hex sealing key"),
        VerifyQuery,
    ),
    responses(
        (status = 200, description = "Verification report (match or mismatch)", body = VerifyResponse),
        (status = 404, description = "Transaction, ledger event or index entry not found", body = crate::error::ErrorBody),
        (status = 409, description = "Mismatch in strict mode", body = crate::error::ErrorBody),
        (status = 502, description = "Blob store or ledger failure", body = crate::error::ErrorBody),
    ),
    tag = "notarization"
)]
pub(crate) async fn verify(
    State(state): State<AppState>,
    Path(tx): Path<String>,
    Query(query): Query<VerifyQuery>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, AppError> {
    let transaction_id = TransactionId::new(tx)?;
    let key = sealing_key_from_headers(&headers)?;

    let report = state.notary.verify(&transaction_id, key).await?;
    state.metrics.record_verification(report.is_match());

    if query.strict && !report.is_match() {
        return Err(AppError::IntegrityMismatch(format!(
            "file notarized in {transaction_id} does not match its ledger fingerprint"
        )));
    }

    Ok(Json(VerifyResponse::from(report)))
}

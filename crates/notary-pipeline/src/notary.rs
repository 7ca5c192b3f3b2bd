//! # The Notary Orchestrator
//!
//! [`Notary`] owns the injected collaborators and runs the upload and verify
//! workflows, plus the account and ledger-only operations the HTTP layer
//! exposes. It holds no per-request state, so one instance is shared across
//! concurrent requests.

use std::sync::Arc;

use notary_blob::BlobStore;
use notary_core::{sha256_fingerprint, BlobAddress, ContentFingerprint, EntryId, TransactionId, UserId};
use notary_crypto::{hash_password, open, seal, verify_password, SealedPayload, SealingKey};
use notary_ledger::{Ledger, LedgerReceipt, LedgerRecord, SigningIdentity};
use serde::Serialize;

use crate::error::PipelineError;
use crate::index::{IndexEntry, IndexStore, NewIndexEntry, UserAccount};
use crate::stage::{UploadStage, VerifyStage};

const MAX_USERNAME_LEN: usize = 64;

/// Static settings for a [`Notary`].
#[derive(Clone)]
pub struct NotarySettings {
    /// Account that submits ledger transactions.
    pub signer: SigningIdentity,
    /// Key used when a request does not carry one.
    pub default_key: Option<SealingKey>,
    /// Prefix joined with a transaction hash to form an explorer URL.
    pub explorer_base_url: String,
}

impl std::fmt::Debug for NotarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotarySettings")
            .field("signer", &self.signer)
            .field("default_key", &self.default_key.as_ref().map(|_| "[REDACTED]"))
            .field("explorer_base_url", &self.explorer_base_url)
            .finish()
    }
}

/// One file to notarize on behalf of an authenticated user.
#[derive(Debug)]
pub struct UploadRequest {
    /// Authenticated owner.
    pub owner: UserId,
    /// Name embedded in the sealed container and recorded in the index.
    pub file_name: String,
    /// Raw file bytes.
    pub contents: Vec<u8>,
    /// Per-request key; falls back to the configured default.
    pub key: Option<SealingKey>,
}

/// Outcome of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Index entry created for the upload.
    pub entry_id: EntryId,
    /// Original file name.
    pub file_name: String,
    /// Fingerprint of the plaintext bytes, as notarized.
    pub fingerprint: ContentFingerprint,
    /// Ledger transaction.
    pub transaction_id: TransactionId,
    /// Block that confirmed the transaction.
    pub block_number: u64,
    /// Block timestamp, Unix seconds.
    pub timestamp: u64,
    /// Block explorer URL for the transaction.
    pub explorer_url: String,
    /// Address of the sealed container.
    pub blob_address: BlobAddress,
    /// Gateway link to the sealed container.
    pub blob_link: String,
}

/// Why a verification did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    /// The container opened, but its contents hash to a different value.
    DigestDiffers,
    /// The container no longer authenticates under the key (tampered blob
    /// or wrong key).
    Undecryptable,
}

/// Result of comparing recomputed and notarized fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// Byte-for-byte equal.
    Match,
    /// Not equal, with the reason.
    Mismatch(MismatchReason),
}

/// Full verification report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// The verified transaction.
    pub transaction_id: TransactionId,
    /// Value stored on the ledger.
    pub ledger_fingerprint: String,
    /// Contract timestamp of the ledger record, Unix seconds.
    pub ledger_timestamp: u64,
    /// Position of the record in the contract's list.
    pub sequence_index: u64,
    /// Fingerprint of the decrypted contents, when the container opened.
    pub recomputed: Option<ContentFingerprint>,
    /// File name recovered from the container, when it opened.
    pub file_name: Option<String>,
    /// Where the container lives.
    pub blob_address: BlobAddress,
    /// Gateway link to the container.
    pub blob_link: String,
    /// The comparison result.
    pub verdict: Verdict,
}

impl VerifyReport {
    /// Whether the file matched its notarized fingerprint.
    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }
}

/// The notarization pipeline.
pub struct Notary {
    blobs: Arc<dyn BlobStore>,
    ledger: Arc<dyn Ledger>,
    index: Arc<dyn IndexStore>,
    settings: NotarySettings,
}

impl std::fmt::Debug for Notary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notary")
            .field("blobs", &self.blobs.backend_name())
            .field("ledger", &self.ledger.chain_name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Notary {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        ledger: Arc<dyn Ledger>,
        index: Arc<dyn IndexStore>,
        settings: NotarySettings,
    ) -> Self {
        Self {
            blobs,
            ledger,
            index,
            settings,
        }
    }

    /// The blob store collaborator.
    pub fn blob_store(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// The ledger collaborator.
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// The index collaborator.
    pub fn index(&self) -> &Arc<dyn IndexStore> {
        &self.index
    }

    /// Block explorer URL for a transaction.
    pub fn explorer_url(&self, transaction_id: &TransactionId) -> String {
        format!("{}{}", self.settings.explorer_base_url, transaction_id)
    }

    fn resolve_key(&self, key: Option<SealingKey>) -> Result<SealingKey, PipelineError> {
        key.or_else(|| self.settings.default_key.clone())
            .ok_or(PipelineError::MissingKey)
    }

    // ── Accounts ─────────────────────────────────────────────────────

    /// Create an account with an Argon2id password digest.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserAccount, PipelineError> {
        let username = username.trim();
        if username.is_empty() || username.len() > MAX_USERNAME_LEN {
            return Err(PipelineError::InvalidInput(format!(
                "username must be 1-{MAX_USERNAME_LEN} characters"
            )));
        }
        if password.is_empty() {
            return Err(PipelineError::InvalidInput("password must not be empty".into()));
        }

        let pw = password.to_string();
        let digest = tokio::task::spawn_blocking(move || hash_password(&pw))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(|source| PipelineError::Crypto {
                stage: "register",
                source,
            })?;

        let user = self
            .index
            .create_user(username, &digest)
            .await
            .map_err(|source| PipelineError::Index {
                stage: "register",
                source,
            })?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials. Unknown users and wrong passwords are reported
    /// identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, PipelineError> {
        let user = self
            .index
            .find_user_by_name(username.trim())
            .await
            .map_err(|source| PipelineError::Index {
                stage: "authenticate",
                source,
            })?
            .ok_or(PipelineError::InvalidCredentials)?;

        let pw = password.to_string();
        let digest = user.password_digest.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&pw, &digest))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(|source| PipelineError::Crypto {
                stage: "authenticate",
                source,
            })?;

        if !ok {
            tracing::warn!(username = %user.username, "password rejected");
            return Err(PipelineError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Index entries of a user, newest first.
    pub async fn list_transactions(&self, username: &str) -> Result<Vec<IndexEntry>, PipelineError> {
        let index_err = |source| PipelineError::Index {
            stage: "list_transactions",
            source,
        };
        let user = self
            .index
            .find_user_by_name(username.trim())
            .await
            .map_err(index_err)?
            .ok_or_else(|| PipelineError::UnknownUser(username.to_string()))?;
        self.index.list_by_owner(user.id).await.map_err(index_err)
    }

    // ── Upload ───────────────────────────────────────────────────────

    /// Hash, seal, store, notarize and index one file.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, PipelineError> {
        let UploadRequest {
            owner,
            file_name,
            contents,
            key,
        } = request;
        let key = self.resolve_key(key)?;
        tracing::debug!(stage = %UploadStage::Received, owner = %owner, file = %file_name, size = contents.len());

        let fingerprint = sha256_fingerprint(&contents);
        tracing::debug!(stage = %UploadStage::Hashed, fingerprint = %fingerprint);

        let sealed = seal(&contents, &file_name, &key).map_err(|source| PipelineError::Crypto {
            stage: UploadStage::Encrypted.as_str(),
            source,
        })?;
        tracing::debug!(stage = %UploadStage::Encrypted, sealed_size = sealed.as_bytes().len());

        let blob_address = self
            .blobs
            .put(sealed.as_bytes())
            .await
            .map_err(|source| PipelineError::BlobStore {
                stage: UploadStage::BlobStored.as_str(),
                source,
            })?;
        tracing::debug!(stage = %UploadStage::BlobStored, blob = %blob_address);

        let receipt = match self
            .ledger
            .submit_fingerprint(&fingerprint, &self.settings.signer)
            .await
        {
            Ok(receipt) => receipt,
            Err(source) => {
                tracing::warn!(
                    blob = %blob_address,
                    error = %source,
                    "ledger submission failed, blob left orphaned"
                );
                return Err(PipelineError::Ledger {
                    stage: UploadStage::LedgerSubmitted.as_str(),
                    source,
                });
            }
        };
        tracing::debug!(stage = %UploadStage::LedgerSubmitted, tx = %receipt.transaction_id);

        let explorer_url = self.explorer_url(&receipt.transaction_id);
        let entry = match self
            .index
            .insert_entry(NewIndexEntry {
                transaction_id: receipt.transaction_id.clone(),
                file_name: file_name.clone(),
                fingerprint,
                explorer_link: explorer_url.clone(),
                blob_address: blob_address.clone(),
                owner_id: owner,
            })
            .await
        {
            Ok(entry) => entry,
            Err(source) => {
                tracing::warn!(
                    blob = %blob_address,
                    tx = %receipt.transaction_id,
                    error = %source,
                    "index insert failed, blob and ledger record left orphaned"
                );
                return Err(PipelineError::Index {
                    stage: UploadStage::Indexed.as_str(),
                    source,
                });
            }
        };

        tracing::debug!(stage = %UploadStage::Indexed, entry = %entry.id);

        tracing::info!(
            stage = %UploadStage::Complete,
            tx = %receipt.transaction_id,
            fingerprint = %fingerprint,
            blob = %blob_address,
            "upload notarized"
        );
        Ok(UploadReceipt {
            entry_id: entry.id,
            file_name,
            fingerprint,
            transaction_id: receipt.transaction_id,
            block_number: receipt.block_number,
            timestamp: receipt.timestamp,
            explorer_url,
            blob_link: self.blobs.gateway_link(&blob_address),
            blob_address,
        })
    }

    // ── Verify ───────────────────────────────────────────────────────

    /// Recompute the fingerprint of a notarized file and compare it with
    /// the ledger.
    ///
    /// A container that no longer opens is a [`Verdict::Mismatch`], not an
    /// error. Errors are reserved for lookups that miss and collaborator
    /// failures.
    pub async fn verify(
        &self,
        transaction_id: &TransactionId,
        key: Option<SealingKey>,
    ) -> Result<VerifyReport, PipelineError> {
        tracing::debug!(stage = %VerifyStage::Requested, tx = %transaction_id);

        let record = self
            .ledger
            .lookup_by_transaction(transaction_id)
            .await
            .map_err(|source| PipelineError::Ledger {
                stage: VerifyStage::LedgerFetched.as_str(),
                source,
            })?;
        tracing::debug!(stage = %VerifyStage::LedgerFetched, index = record.sequence_index);

        let entry = self
            .index
            .find_by_transaction(transaction_id)
            .await
            .map_err(|source| PipelineError::Index {
                stage: VerifyStage::IndexLookup.as_str(),
                source,
            })?
            .ok_or_else(|| PipelineError::IndexEntryMissing(transaction_id.clone()))?;
        tracing::debug!(stage = %VerifyStage::IndexLookup, blob = %entry.blob_address);

        let bytes = self
            .blobs
            .get(&entry.blob_address)
            .await
            .map_err(|source| PipelineError::BlobStore {
                stage: VerifyStage::BlobFetched.as_str(),
                source,
            })?;
        tracing::debug!(stage = %VerifyStage::BlobFetched, size = bytes.len());

        // The key only matters once there is a container to open.
        let key = self.resolve_key(key)?;
        let opened = SealedPayload::from_bytes(bytes).and_then(|payload| open(&payload, &key));
        let (file_name, recomputed, verdict) = match opened {
            Ok(file) => {
                tracing::debug!(stage = %VerifyStage::Decrypted, file = %file.file_name);
                let recomputed = sha256_fingerprint(&file.contents);
                let verdict = match ContentFingerprint::from_hex(&record.fingerprint) {
                    Ok(on_ledger) if on_ledger == recomputed => Verdict::Match,
                    _ => Verdict::Mismatch(MismatchReason::DigestDiffers),
                };
                (Some(file.file_name), Some(recomputed), verdict)
            }
            Err(e) => {
                tracing::debug!(stage = %VerifyStage::Decrypted, opened = false);
                tracing::warn!(tx = %transaction_id, error = %e, "stored container did not open");
                (None, None, Verdict::Mismatch(MismatchReason::Undecryptable))
            }
        };
        tracing::debug!(stage = %VerifyStage::Compared, verdict = ?verdict);

        if verdict != Verdict::Match {
            tracing::warn!(tx = %transaction_id, verdict = ?verdict, "verification mismatch");
        }

        Ok(VerifyReport {
            transaction_id: transaction_id.clone(),
            ledger_fingerprint: record.fingerprint,
            ledger_timestamp: record.timestamp,
            sequence_index: record.sequence_index,
            recomputed,
            file_name,
            blob_link: self.blobs.gateway_link(&entry.blob_address),
            blob_address: entry.blob_address,
            verdict,
        })
    }

    // ── Ledger-only operations ───────────────────────────────────────

    /// Store an arbitrary hash string on the ledger without touching the
    /// blob store or index.
    pub async fn store_hash(&self, hash_value: &str) -> Result<LedgerReceipt, PipelineError> {
        self.ledger
            .submit_hash(hash_value, &self.settings.signer)
            .await
            .map_err(|source| PipelineError::Ledger {
                stage: UploadStage::LedgerSubmitted.as_str(),
                source,
            })
    }

    /// Read the `HashStored` event of a transaction.
    pub async fn lookup_hash(&self, transaction_id: &TransactionId) -> Result<LedgerRecord, PipelineError> {
        self.ledger
            .lookup_by_transaction(transaction_id)
            .await
            .map_err(|source| PipelineError::Ledger {
                stage: VerifyStage::LedgerFetched.as_str(),
                source,
            })
    }

    // ── Administration ───────────────────────────────────────────────

    /// Delete every index entry. Blobs and ledger records are untouched.
    pub async fn reset_index(&self) -> Result<u64, PipelineError> {
        let removed = self
            .index
            .reset_entries()
            .await
            .map_err(|source| PipelineError::Index {
                stage: "reset",
                source,
            })?;
        tracing::warn!(removed, "index reset");
        Ok(removed)
    }
}

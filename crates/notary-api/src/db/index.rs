//! Postgres-backed [`IndexStore`].
//!
//! Operates on the `users` and `transactions` tables. Uniqueness of
//! usernames, transaction hashes and blob addresses, and the owner foreign
//! key, are enforced by the schema; violations come back as
//! [`IndexError::Conflict`] and [`IndexError::UnknownOwner`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notary_core::{BlobAddress, ContentFingerprint, EntryId, TransactionId, UserId};
use notary_pipeline::{IndexEntry, IndexError, IndexStore, NewIndexEntry, UserAccount};
use sqlx::PgPool;

/// [`IndexStore`] over a SQLx Postgres pool.
#[derive(Debug, Clone)]
pub struct PgIndexStore {
    pool: PgPool,
}

impl PgIndexStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IndexStore for PgIndexStore {
    async fn create_user(&self, username: &str, password_digest: &str) -> Result<UserAccount, IndexError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (uname, pass_hash) VALUES ($1, $2)
             RETURNING id, uname, pass_hash",
        )
        .bind(username)
        .bind(password_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("username '{username}' is taken"), None))?;

        Ok(row.into_account())
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserAccount>, IndexError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, uname, pass_hash FROM users WHERE uname = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(UserRow::into_account))
    }

    async fn insert_entry(&self, entry: NewIndexEntry) -> Result<IndexEntry, IndexError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO transactions (tr_hash, file_name, file_hash, bc_hash_link, bc_file_link, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, created_at",
        )
        .bind(entry.transaction_id.as_str())
        .bind(&entry.file_name)
        .bind(entry.fingerprint.to_hex())
        .bind(&entry.explorer_link)
        .bind(entry.blob_address.as_str())
        .bind(entry.owner_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                || {
                    format!(
                        "transaction {} or blob {} is already indexed",
                        entry.transaction_id, entry.blob_address
                    )
                },
                Some(entry.owner_id),
            )
        })?;

        Ok(IndexEntry {
            id: EntryId(id),
            transaction_id: entry.transaction_id,
            file_name: entry.file_name,
            fingerprint: entry.fingerprint,
            explorer_link: entry.explorer_link,
            blob_address: entry.blob_address,
            owner_id: entry.owner_id,
            created_at,
        })
    }

    async fn find_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<IndexEntry>, IndexError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, tr_hash, file_name, file_hash, bc_hash_link, bc_file_link, user_id, created_at
             FROM transactions WHERE tr_hash = $1",
        )
        .bind(transaction_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(TransactionRow::into_entry).transpose()
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<IndexEntry>, IndexError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, tr_hash, file_name, file_hash, bc_hash_link, bc_file_link, user_id, created_at
             FROM transactions WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(TransactionRow::into_entry).collect()
    }

    async fn reset_entries(&self) -> Result<u64, IndexError> {
        let result = sqlx::query("DELETE FROM transactions")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), IndexError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

// ── Error mapping ───────────────────────────────────────────────────

fn database_error(err: sqlx::Error) -> IndexError {
    IndexError::Database(err.to_string())
}

fn map_write_error(
    err: sqlx::Error,
    conflict: impl FnOnce() -> String,
    owner: Option<UserId>,
) -> IndexError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return IndexError::Conflict(conflict());
        }
        if let (true, Some(owner)) = (db.is_foreign_key_violation(), owner) {
            return IndexError::UnknownOwner(owner);
        }
    }
    database_error(err)
}

// ── Row types ───────────────────────────────────────────────────────

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    uname: String,
    pass_hash: String,
}

impl UserRow {
    fn into_account(self) -> UserAccount {
        UserAccount {
            id: UserId(self.id),
            username: self.uname,
            password_digest: self.pass_hash,
        }
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    tr_hash: String,
    file_name: String,
    file_hash: String,
    bc_hash_link: String,
    bc_file_link: String,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_entry(self) -> Result<IndexEntry, IndexError> {
        let corrupt = |e: notary_core::ValidationError| {
            IndexError::CorruptRow(format!("transactions row {}: {e}", self.id))
        };
        Ok(IndexEntry {
            id: EntryId(self.id),
            transaction_id: TransactionId::new(self.tr_hash.as_str()).map_err(corrupt)?,
            file_name: self.file_name.clone(),
            fingerprint: ContentFingerprint::from_hex(&self.file_hash).map_err(corrupt)?,
            explorer_link: self.bc_hash_link.clone(),
            blob_address: BlobAddress::new(self.bc_file_link.as_str()).map_err(corrupt)?,
            owner_id: UserId(self.user_id),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> TransactionRow {
        TransactionRow {
            id: 9,
            tr_hash: format!("0x{}", "ab".repeat(32)),
            file_name: "report.pdf".into(),
            file_hash: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".into(),
            bc_hash_link: "https://sepolia.etherscan.io/tx/0xabab".into(),
            bc_file_link: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".into(),
            user_id: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_maps_to_entry() {
        let entry = row().into_entry().unwrap();
        assert_eq!(entry.id, EntryId(9));
        assert_eq!(entry.owner_id, UserId(3));
        assert_eq!(entry.blob_address.as_str(), "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
        assert_eq!(
            entry.fingerprint,
            notary_core::sha256_fingerprint(b"hello")
        );
    }

    #[test]
    fn malformed_row_is_reported_as_corrupt() {
        let mut bad = row();
        bad.file_hash = "not-a-digest".into();
        assert!(matches!(bad.into_entry(), Err(IndexError::CorruptRow(_))));
    }

    #[test]
    fn user_row_maps_to_account() {
        let account = UserRow {
            id: 1,
            uname: "alice".into(),
            pass_hash: "$argon2id$...".into(),
        }
        .into_account();
        assert_eq!(account.id, UserId(1));
        assert_eq!(account.username, "alice");
    }
}

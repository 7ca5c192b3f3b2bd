//! # Local Index
//!
//! The relational side of the system: user accounts, and one entry per
//! successful upload correlating the ledger transaction with the blob
//! address and the owning user.
//!
//! Entries are insert-only. The only deletion path is
//! [`IndexStore::reset_entries`], the administrative bulk reset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notary_core::{BlobAddress, Classify, ContentFingerprint, EntryId, ErrorKind, TransactionId, UserId};
use parking_lot::RwLock;
use serde::Serialize;

/// A registered user.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Surrogate key.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2id PHC digest of the password.
    pub password_digest: String,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_digest", &"[REDACTED]")
            .finish()
    }
}

/// Fields of an index entry supplied by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIndexEntry {
    /// Ledger transaction that notarized the fingerprint.
    pub transaction_id: TransactionId,
    /// Original file name.
    pub file_name: String,
    /// Fingerprint of the plaintext file bytes.
    pub fingerprint: ContentFingerprint,
    /// Block explorer URL of the transaction.
    pub explorer_link: String,
    /// Where the sealed container lives.
    pub blob_address: BlobAddress,
    /// Uploading user.
    pub owner_id: UserId,
}

/// A persisted index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Surrogate key.
    pub id: EntryId,
    /// Ledger transaction that notarized the fingerprint (unique).
    pub transaction_id: TransactionId,
    /// Original file name.
    pub file_name: String,
    /// Fingerprint of the plaintext file bytes.
    pub fingerprint: ContentFingerprint,
    /// Block explorer URL of the transaction.
    pub explorer_link: String,
    /// Where the sealed container lives (unique).
    pub blob_address: BlobAddress,
    /// Uploading user.
    pub owner_id: UserId,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Index store errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A unique constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The entry references a user that does not exist.
    #[error("unknown owner: {0}")]
    UnknownOwner(UserId),
    /// The backing database failed.
    #[error("database error: {0}")]
    Database(String),
    /// A stored row could not be decoded into domain types.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

impl Classify for IndexError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::UnknownOwner(_) => ErrorKind::NotFound,
            Self::Database(_) | Self::CorruptRow(_) => ErrorKind::Internal,
        }
    }
}

/// Persistence for users and index entries.
///
/// Implementations must make `create_user` and `insert_entry` atomic
/// insert-if-absent operations on their unique keys.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Insert a user. Fails with [`IndexError::Conflict`] if the username is taken.
    async fn create_user(&self, username: &str, password_digest: &str) -> Result<UserAccount, IndexError>;

    /// Find a user by exact username.
    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserAccount>, IndexError>;

    /// Insert an entry. Fails with [`IndexError::Conflict`] if the
    /// transaction id or blob address already exists.
    async fn insert_entry(&self, entry: NewIndexEntry) -> Result<IndexEntry, IndexError>;

    /// Find the entry for a transaction.
    async fn find_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<IndexEntry>, IndexError>;

    /// All entries owned by a user, newest first.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<IndexEntry>, IndexError>;

    /// Delete every entry. Returns the number deleted.
    async fn reset_entries(&self) -> Result<u64, IndexError>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> Result<(), IndexError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserAccount>,
    entries: Vec<IndexEntry>,
    next_user_id: i64,
    next_entry_id: i64,
}

/// In-memory [`IndexStore`]. All state is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    state: RwLock<MemoryState>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexStore for MemoryIndex {
    async fn create_user(&self, username: &str, password_digest: &str) -> Result<UserAccount, IndexError> {
        let mut state = self.state.write();
        if state.users.iter().any(|u| u.username == username) {
            return Err(IndexError::Conflict(format!("username '{username}' is taken")));
        }
        state.next_user_id += 1;
        let user = UserAccount {
            id: UserId(state.next_user_id),
            username: username.to_string(),
            password_digest: password_digest.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserAccount>, IndexError> {
        Ok(self.state.read().users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_entry(&self, entry: NewIndexEntry) -> Result<IndexEntry, IndexError> {
        let mut state = self.state.write();
        if !state.users.iter().any(|u| u.id == entry.owner_id) {
            return Err(IndexError::UnknownOwner(entry.owner_id));
        }
        if state.entries.iter().any(|e| e.transaction_id == entry.transaction_id) {
            return Err(IndexError::Conflict(format!(
                "transaction {} is already indexed",
                entry.transaction_id
            )));
        }
        if state.entries.iter().any(|e| e.blob_address == entry.blob_address) {
            return Err(IndexError::Conflict(format!(
                "blob {} is already indexed",
                entry.blob_address
            )));
        }
        state.next_entry_id += 1;
        let stored = IndexEntry {
            id: EntryId(state.next_entry_id),
            transaction_id: entry.transaction_id,
            file_name: entry.file_name,
            fingerprint: entry.fingerprint,
            explorer_link: entry.explorer_link,
            blob_address: entry.blob_address,
            owner_id: entry.owner_id,
            created_at: Utc::now(),
        };
        state.entries.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<IndexEntry>, IndexError> {
        Ok(self
            .state
            .read()
            .entries
            .iter()
            .find(|e| &e.transaction_id == transaction_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<IndexEntry>, IndexError> {
        let mut owned: Vec<IndexEntry> = self
            .state
            .read()
            .entries
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn reset_entries(&self) -> Result<u64, IndexError> {
        let mut state = self.state.write();
        let removed = state.entries.len() as u64;
        state.entries.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_core::sha256_fingerprint;

    fn new_entry(owner: UserId, seed: u8) -> NewIndexEntry {
        NewIndexEntry {
            transaction_id: TransactionId::from_hash_bytes(&[seed; 32]),
            file_name: format!("file-{seed}.txt"),
            fingerprint: sha256_fingerprint(&[seed]),
            explorer_link: format!("https://explorer.test/tx/{seed}"),
            blob_address: BlobAddress::new(format!("blob{seed}")).unwrap(),
            owner_id: owner,
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let index = MemoryIndex::new();
        index.create_user("alice", "digest").await.unwrap();
        let err = index.create_user("alice", "other").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn user_ids_are_assigned_sequentially() {
        let index = MemoryIndex::new();
        let a = index.create_user("a", "d").await.unwrap();
        let b = index.create_user("b", "d").await.unwrap();
        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn duplicate_transaction_conflicts() {
        let index = MemoryIndex::new();
        let user = index.create_user("alice", "d").await.unwrap();
        index.insert_entry(new_entry(user.id, 1)).await.unwrap();
        let mut dup = new_entry(user.id, 2);
        dup.transaction_id = TransactionId::from_hash_bytes(&[1; 32]);
        assert!(matches!(
            index.insert_entry(dup).await,
            Err(IndexError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_blob_address_conflicts() {
        let index = MemoryIndex::new();
        let user = index.create_user("alice", "d").await.unwrap();
        index.insert_entry(new_entry(user.id, 1)).await.unwrap();
        let mut dup = new_entry(user.id, 2);
        dup.blob_address = BlobAddress::new("blob1").unwrap();
        assert!(matches!(
            index.insert_entry(dup).await,
            Err(IndexError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn entry_for_unknown_owner_is_rejected() {
        let index = MemoryIndex::new();
        assert!(matches!(
            index.insert_entry(new_entry(UserId(99), 1)).await,
            Err(IndexError::UnknownOwner(UserId(99)))
        ));
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first_and_scoped() {
        let index = MemoryIndex::new();
        let alice = index.create_user("alice", "d").await.unwrap();
        let bob = index.create_user("bob", "d").await.unwrap();
        index.insert_entry(new_entry(alice.id, 1)).await.unwrap();
        index.insert_entry(new_entry(bob.id, 2)).await.unwrap();
        index.insert_entry(new_entry(alice.id, 3)).await.unwrap();

        let listed = index.list_by_owner(alice.id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["file-3.txt", "file-1.txt"]);
    }

    #[tokio::test]
    async fn reset_removes_entries_but_keeps_users() {
        let index = MemoryIndex::new();
        let user = index.create_user("alice", "d").await.unwrap();
        index.insert_entry(new_entry(user.id, 1)).await.unwrap();
        index.insert_entry(new_entry(user.id, 2)).await.unwrap();
        assert_eq!(index.reset_entries().await.unwrap(), 2);
        assert!(index.list_by_owner(user.id).await.unwrap().is_empty());
        assert!(index.find_user_by_name("alice").await.unwrap().is_some());
    }

    #[test]
    fn user_debug_redacts_digest() {
        let user = UserAccount {
            id: UserId(1),
            username: "alice".into(),
            password_digest: "$argon2id$secret".into(),
        };
        assert!(!format!("{user:?}").contains("secret"));
    }
}

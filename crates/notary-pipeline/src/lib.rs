//! # notary-pipeline — Upload and Verify Orchestration
//!
//! Sequences the leaf components into the two notarization workflows:
//!
//! ```text
//! upload: Received → Hashed → Encrypted → BlobStored → LedgerSubmitted → Indexed → Complete
//! verify: Requested → LedgerFetched → IndexLookup → BlobFetched → Decrypted → Compared → {Match, Mismatch}
//! ```
//!
//! Collaborators are injected as trait objects ([`BlobStore`], [`Ledger`],
//! [`IndexStore`]), so the same orchestrator runs against Pinata, an EVM
//! chain and Postgres in production, and against in-memory stores in tests.
//!
//! ## Failure Policy
//!
//! Transitions are strictly sequential and never rolled back. A failure
//! after `BlobStored` leaves an orphaned blob, which is logged with its
//! address. Every error carries the stage it occurred in and maps onto the
//! core [`ErrorKind`](notary_core::ErrorKind) taxonomy.
//!
//! [`BlobStore`]: notary_blob::BlobStore
//! [`Ledger`]: notary_ledger::Ledger

pub mod error;
pub mod index;
pub mod notary;
pub mod stage;

pub use error::PipelineError;
pub use index::{IndexEntry, IndexError, IndexStore, MemoryIndex, NewIndexEntry, UserAccount};
pub use notary::{MismatchReason, Notary, NotarySettings, UploadReceipt, UploadRequest, Verdict, VerifyReport};
pub use stage::{UploadStage, VerifyStage};

#![deny(missing_docs)]

//! # notary-core — Foundational Types for the Notary Stack
//!
//! Every other crate in the workspace depends on this one. It carries no
//! internal dependencies, only `serde`, `thiserror`, `sha2` and `hex`.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`TransactionId`] cannot be
//!    passed where a [`BlobAddress`] is expected, and both validate their
//!    format at construction.
//!
//! 2. **[`sha256_fingerprint()`] is the sole fingerprint function.** Upload and
//!    verification both go through it, so the notarized value and the
//!    recomputed value can never be produced by different code paths.
//!
//! 3. **One error taxonomy.** Each crate defines its own `thiserror` enum and
//!    maps it onto [`ErrorKind`] through [`Classify`], so callers can tell
//!    retryable upstream failures from permanent validation failures.

pub mod error;
pub mod fingerprint;
pub mod identity;

pub use error::{Classify, ErrorKind, ValidationError};
pub use fingerprint::{sha256_fingerprint, ContentFingerprint, FINGERPRINT_HEX_LEN};
pub use identity::{BlobAddress, EntryId, TransactionId, UserId};

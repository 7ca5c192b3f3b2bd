//! # notary-cli — CLI Tool for the Notary Stack
//!
//! Local, offline counterparts of the service's building blocks. Nothing
//! here talks to the blob store or the ledger.
//!
//! ## Subcommands
//!
//! - `notary hash` prints a file's SHA-256 fingerprint, optionally checking
//!   it against an expected value.
//! - `notary seal` encrypts a file into the same container the service
//!   pins (`nonce || ciphertext || tag`, file name sealed inside).
//! - `notary open` decrypts a container and restores the original file as
//!   `decrypted_<name>`.
//! - `notary keygen` prints or writes a fresh 256-bit sealing key.
//!
//! ```bash
//! notary keygen --output notary.key
//! notary seal report.pdf --key-file notary.key
//! notary open report.pdf.sealed --key-file notary.key
//! notary hash report.pdf --expect 2cf24dba...
//! ```

pub mod digest;
pub mod keys;
pub mod sealing;

/// Exit code for a fingerprint that does not match `--expect`.
pub const EXIT_MISMATCH: u8 = 2;

//! # Hash Subcommand
//!
//! Prints the SHA-256 fingerprint the service would notarize for a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use notary_core::{sha256_fingerprint, ContentFingerprint};

use crate::EXIT_MISMATCH;

/// Arguments for `notary hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to fingerprint.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected fingerprint (64 hex characters). Exit code 2 on mismatch.
    #[arg(long, value_name = "HEX")]
    pub expect: Option<String>,
}

/// Fingerprint a file's raw bytes.
pub fn fingerprint_file(path: &Path) -> Result<ContentFingerprint> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(sha256_fingerprint(&bytes))
}

/// Execute `notary hash`.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let actual = fingerprint_file(&args.file)?;

    let Some(expected) = &args.expect else {
        println!("{actual}  {}", args.file.display());
        return Ok(0);
    };

    let expected = ContentFingerprint::from_hex(expected).context("invalid --expect fingerprint")?;
    if expected == actual {
        println!("OK: {} matches {actual}", args.file.display());
        Ok(0)
    } else {
        println!("MISMATCH: {}", args.file.display());
        println!("  expected: {expected}");
        println!("  actual:   {actual}");
        Ok(EXIT_MISMATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn expected_fingerprint_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        let args = HashArgs {
            file: path.clone(),
            expect: Some(HELLO.to_uppercase()),
        };
        assert_eq!(run_hash(&args).unwrap(), 0);

        let args = HashArgs {
            file: path,
            expect: Some("00".repeat(32)),
        };
        assert_eq!(run_hash(&args).unwrap(), EXIT_MISMATCH);
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = HashArgs {
            file: PathBuf::from("/definitely/not/here"),
            expect: None,
        };
        assert!(run_hash(&args).is_err());
    }
}

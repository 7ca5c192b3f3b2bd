//! # Key Subcommand and Key Resolution
//!
//! `notary keygen`, plus the shared `--key` / `--key-file` arguments used by
//! `seal` and `open`.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use notary_crypto::SealingKey;
use zeroize::Zeroizing;

/// Environment variable consulted when neither `--key` nor `--key-file` is given.
pub const KEY_ENV_VAR: &str = "NOTARY_SEALING_KEY";

/// Where to read the sealing key from.
#[derive(Args, Debug, Clone, Default)]
pub struct KeySource {
    /// Sealing key as 64 hex characters.
    #[arg(long, conflicts_with = "key_file")]
    pub key: Option<String>,

    /// File containing the hex sealing key.
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,
}

impl KeySource {
    /// Resolve the key: `--key`, then `--key-file`, then `NOTARY_SEALING_KEY`.
    pub fn resolve(&self) -> Result<SealingKey> {
        if let Some(hex) = &self.key {
            return SealingKey::from_hex(hex).context("invalid --key");
        }
        if let Some(path) = &self.key_file {
            return read_key_file(path);
        }
        match std::env::var(KEY_ENV_VAR) {
            Ok(hex) => {
                let hex = Zeroizing::new(hex);
                SealingKey::from_hex(&hex).with_context(|| format!("invalid {KEY_ENV_VAR}"))
            }
            Err(_) => bail!("no sealing key: pass --key, --key-file, or set {KEY_ENV_VAR}"),
        }
    }
}

fn read_key_file(path: &Path) -> Result<SealingKey> {
    let contents = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file: {}", path.display()))?,
    );
    SealingKey::from_hex(&contents)
        .with_context(|| format!("invalid key in {}", path.display()))
}

/// Arguments for `notary keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the key to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Generate a random sealing key.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let key = SealingKey::generate();
    let hex = Zeroizing::new(key.to_hex());

    match &args.output {
        Some(path) => {
            let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    bail!("refusing to overwrite existing key file: {}", path.display())
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to create key file: {}", path.display()))
                }
            };
            file.write_all(hex.as_bytes())
                .with_context(|| format!("failed to write key file: {}", path.display()))?;
            tracing::info!(path = %path.display(), "sealing key written");
            println!("OK: generated 256-bit sealing key");
            println!("  Key file: {}", path.display());
        }
        None => println!("{}", hex.as_str()),
    }

    Ok(0)
}

//! # Seal and Open Subcommands
//!
//! Local encryption and decryption of the container format the service
//! pins to the blob store. A container produced by `notary seal` can be
//! verified by the service, and a container downloaded from the gateway can
//! be restored with `notary open`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use notary_core::sha256_fingerprint;
use notary_crypto::{open, seal, SealedPayload, SealingKey};

use crate::keys::KeySource;

/// Suffix appended to sealed files.
pub const SEALED_SUFFIX: &str = "sealed";

/// Prefix of restored files.
pub const DECRYPTED_PREFIX: &str = "decrypted_";

/// Arguments for `notary seal`.
#[derive(Args, Debug)]
pub struct SealArgs {
    /// File to seal.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output path. Default: `<FILE>.sealed`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub key: KeySource,
}

/// Arguments for `notary open`.
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Sealed container to open.
    #[arg(value_name = "SEALED")]
    pub file: PathBuf,

    /// Directory to restore into. Default: the container's directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub key: KeySource,
}

/// Seal `input` under `key`, writing the container to `output`.
pub fn seal_file(input: &Path, output: &Path, key: &SealingKey) -> Result<()> {
    let contents =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no UTF-8 file name", input.display()))?;

    let sealed = seal(&contents, file_name, key).context("failed to seal file")?;
    std::fs::write(output, sealed.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::debug!(input = %input.display(), output = %output.display(), "sealed");
    Ok(())
}

/// Open the container at `input` and restore the file into `output_dir`.
///
/// Returns the path of the restored file. The sealed name is reduced to its
/// final path component before use.
pub fn open_file(input: &Path, output_dir: &Path, key: &SealingKey) -> Result<PathBuf> {
    let bytes = std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let payload = SealedPayload::from_bytes(bytes).context("not a sealed container")?;
    let opened = open(&payload, key).context("failed to open container (wrong key or tampered file)")?;

    let name = match Path::new(&opened.file_name).file_name() {
        Some(name) => name.to_owned(),
        None => bail!("sealed file name {:?} is not usable", opened.file_name),
    };
    let mut restored_name = std::ffi::OsString::from(DECRYPTED_PREFIX);
    restored_name.push(&name);
    let output = output_dir.join(restored_name);

    std::fs::write(&output, &opened.contents)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::debug!(input = %input.display(), output = %output.display(), "opened");
    Ok(output)
}

/// Execute `notary seal`.
pub fn run_seal(args: &SealArgs) -> Result<u8> {
    let key = args.key.resolve()?;
    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let mut name = args.file.clone().into_os_string();
            name.push(".");
            name.push(SEALED_SUFFIX);
            PathBuf::from(name)
        }
    };

    seal_file(&args.file, &output, &key)?;
    println!("OK: sealed {}", args.file.display());
    println!("  Container: {}", output.display());
    Ok(0)
}

/// Execute `notary open`.
pub fn run_open(args: &OpenArgs) -> Result<u8> {
    let key = args.key.resolve()?;
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let restored = open_file(&args.file, &output_dir, &key)?;
    let contents = std::fs::read(&restored)
        .with_context(|| format!("failed to read back {}", restored.display()))?;
    println!("OK: restored {}", restored.display());
    println!("  Fingerprint: {}", sha256_fingerprint(&contents));
    Ok(0)
}

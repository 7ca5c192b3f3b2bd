//! # notary CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notary_cli::digest::{run_hash, HashArgs};
use notary_cli::keys::{run_keygen, KeygenArgs};
use notary_cli::sealing::{run_open, run_seal, OpenArgs, SealArgs};

/// Notary Stack CLI
///
/// Fingerprint files and seal or open them locally in the container format
/// the notary service pins to IPFS.
#[derive(Parser, Debug)]
#[command(name = "notary", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-256 fingerprint of a file.
    Hash(HashArgs),

    /// Encrypt a file into a sealed container.
    Seal(SealArgs),

    /// Decrypt a sealed container and restore the original file.
    Open(OpenArgs),

    /// Generate a random 256-bit sealing key.
    Keygen(KeygenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Seal(args) => run_seal(&args),
        Commands::Open(args) => run_open(&args),
        Commands::Keygen(args) => run_keygen(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

//! Layerveil - layered text protection
//!
//! A CLI tool that encrypts a message twice (password, then a one-time RSA
//! key pair) and hides the result in a PNG behind a click sequence.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CapacityCommand, CommandExecutor, DecryptCommand, EncryptCommand};

/// Layerveil - layered text protection
///
/// AES-256 with a password, RSA-OAEP with a one-time key pair, and LSB
/// steganography gated by a 4-cell click sequence on a 3x3 grid.
#[derive(Parser)]
#[command(name = "layerveil")]
#[command(version)]
#[command(about = "Encrypt a message and hide it in an image behind a click sequence")]
#[command(long_about = None)]
struct Cli {
    /// Show per-stage progress (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a message into a carrier image
    Encrypt(EncryptCommand),

    /// Recover a message from a stego image
    Decrypt(DecryptCommand),

    /// Show carrier capacity and the bits a message needs
    Capacity(CapacityCommand),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("layerveil=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encrypt(cmd) => cmd.execute(),
        Commands::Decrypt(cmd) => cmd.execute(),
        Commands::Capacity(cmd) => cmd.execute(),
    }
}

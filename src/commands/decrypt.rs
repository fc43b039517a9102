//! Decrypt command - recover a message from a stego image.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use layerveil::crypto::sanitize_pem;
use layerveil::{decrypt, ClickSequence};

use super::CommandExecutor;

/// Recover a message hidden by `encrypt`.
///
/// Fails if the password, private key or click sequence is wrong.
#[derive(Args, Debug)]
pub struct DecryptCommand {
    /// Stego image produced by `encrypt`
    #[arg(short, long)]
    pub image: PathBuf,

    /// Password used at encryption time
    #[arg(short, long)]
    pub password: String,

    /// Private key PEM file written at encryption time
    #[arg(short, long)]
    pub key: PathBuf,

    /// Click sequence used at encryption time
    #[arg(short, long)]
    pub sequence: ClickSequence,
}

impl CommandExecutor for DecryptCommand {
    fn execute(&self) -> Result<()> {
        let image = fs::read(&self.image)
            .with_context(|| format!("Failed to read {}", self.image.display()))?;
        let key_text = fs::read_to_string(&self.key)
            .with_context(|| format!("Failed to read {}", self.key.display()))?;
        let pem = sanitize_pem(&key_text);

        let cells = self.sequence.cells().map(i64::from);
        let text = decrypt(&image, &self.password, &pem, &cells).context("Decryption failed")?;

        println!("{text}");
        Ok(())
    }
}

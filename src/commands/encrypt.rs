//! Encrypt command - protect a message and hide it in a carrier image.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use layerveil::{encrypt, ClickSequence};

use super::{load_carrier, CommandExecutor};

/// Encrypt a message and hide it inside a carrier image.
///
/// Writes a PNG stego image and the one-time private key. Both the key and
/// the click sequence are needed to decrypt; losing the key loses the message.
#[derive(Args, Debug)]
pub struct EncryptCommand {
    /// Carrier image (any format the image crate decodes)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Message to encrypt (reads stdin if omitted)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Password for the symmetric layer
    #[arg(short, long)]
    pub password: String,

    /// Click sequence: 4 distinct cells 1-9, e.g. "1,5,9,3" or "1593"
    #[arg(short, long)]
    pub sequence: ClickSequence,

    /// Output path for the stego image (always PNG)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write the private key PEM here instead of stdout
    #[arg(short, long)]
    pub key_out: Option<PathBuf>,
}

impl CommandExecutor for EncryptCommand {
    fn execute(&self) -> Result<()> {
        let message = self.read_message()?;
        let carrier = load_carrier(&self.carrier)?;

        let cells = self.sequence.cells().map(i64::from);
        let artifact = encrypt(&message, &self.password, &carrier, &cells)
            .context("Encryption failed")?;

        fs::write(&self.output, &artifact.image_png)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        match &self.key_out {
            Some(path) => {
                fs::write(path, artifact.private_key_pem.as_bytes())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Stego image: {}", self.output.display());
                eprintln!("Private key: {}", path.display());
            }
            None => {
                eprintln!("Stego image: {}", self.output.display());
                eprintln!("Private key (keep it secret, it is not stored anywhere):");
                println!("{}", artifact.private_key_pem.as_str());
            }
        }

        eprintln!();
        eprintln!("Share the PNG only through lossless channels; recompression destroys it.");
        Ok(())
    }
}

impl EncryptCommand {
    fn read_message(&self) -> Result<String> {
        let message = match &self.message {
            Some(m) => m.clone(),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read message from stdin")?;
                buf.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        if message.is_empty() {
            bail!("Message cannot be empty");
        }
        Ok(message)
    }
}

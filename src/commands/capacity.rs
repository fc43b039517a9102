//! Capacity command - check whether a message fits a carrier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use layerveil::{required_bits, ClickSequence, PipelineConfig};

use super::{load_carrier, CommandExecutor};

/// Show how many bits a carrier can hold and how many a message needs.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier image
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Message to size against the carrier
    #[arg(short, long)]
    pub message: Option<String>,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let carrier = load_carrier(&self.carrier)?;
        let (width, height) = carrier.dimensions();
        let capacity = carrier.capacity_bits();

        println!("Carrier:  {} ({}x{})", self.carrier.display(), width, height);
        println!("Capacity: {} bits", capacity);

        if let Some(message) = &self.message {
            // Any valid sequence frames to the same length
            let sequence = ClickSequence::new([1, 2, 3, 4])?;
            let needed = required_bits(message, &sequence, &PipelineConfig::default())
                .context("Failed to size message")?;

            println!("Required: {} bits", needed);
            if needed <= capacity {
                println!("Fits, {} bits to spare", capacity - needed);
            } else {
                println!(
                    "Does not fit: needs at least {} more pixels",
                    needed - capacity
                );
            }
        }

        Ok(())
    }
}

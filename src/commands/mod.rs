//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod decrypt;
mod encrypt;

pub use capacity::CapacityCommand;
pub use decrypt::DecryptCommand;
pub use encrypt::EncryptCommand;

use anyhow::{Context, Result};
use std::path::Path;

use layerveil::stego::CarrierImage;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Loads a carrier image from disk.
fn load_carrier(path: &Path) -> Result<CarrierImage> {
    CarrierImage::from_file(path)
        .with_context(|| format!("Failed to read image {}", path.display()))
}

//! Steganography module for hiding data in images.
//!
//! Supports:
//! - Image LSB steganography, one bit per pixel in the red channel (PNG output)
//! - Click-sequence gating through embedded metadata

pub mod image;
pub mod payload;

pub use self::image::CarrierImage;
pub use payload::{StegoMetadata, END_MARKER, END_MARKER_BITS, SEPARATOR};

use thiserror::Error;

/// Errors that can occur during image steganography.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Carrier too small: need {needed} bits, have capacity for {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("no end marker found")]
    NoEndMarker,

    #[error("Payload contains the end marker at bit {bit}")]
    MarkerInPayload { bit: usize },

    #[error("malformed payload")]
    MalformedPayload,

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("sequence mismatch")]
    SequenceMismatch,

    #[error("Pixel buffer of {len} bytes does not fit {width}x{height} RGBA")]
    InvalidBuffer { width: u32, height: u32, len: usize },

    #[error("Image load error: {0}")]
    ImageLoadError(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),
}

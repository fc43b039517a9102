//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides one bit per pixel in the least significant bit of the red channel,
//! walking the RGBA buffer in raster order. Green, blue and alpha are never
//! touched. Only lossless formats survive; the output is always PNG.
//!
//! Capacity: one bit per pixel.

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

use super::payload::{self, END_MARKER, END_MARKER_BITS};
use super::StegoError;
use crate::sequence::ClickSequence;

/// Bytes per RGBA pixel.
const PIXEL_STRIDE: usize = 4;

/// Red channel offset within a pixel.
const RED: usize = 0;

/// An RGBA carrier image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierImage {
    pixels: RgbaImage,
}

impl CarrierImage {
    /// Wraps a raw RGBA buffer (4 bytes per pixel, row-major).
    pub fn from_rgba(width: u32, height: u32, raw: Vec<u8>) -> Result<Self, StegoError> {
        let len = raw.len();
        let pixels = RgbaImage::from_raw(width, height, raw).ok_or(StegoError::InvalidBuffer {
            width,
            height,
            len,
        })?;
        Ok(Self { pixels })
    }

    /// Wraps any decoded image, converting it to RGBA.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }

    /// Decodes an image file held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| StegoError::ImageLoadError(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Decodes an image file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let image = image::open(path).map_err(|e| StegoError::ImageLoadError(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Number of bits this carrier can hold (one per pixel).
    pub fn capacity_bits(&self) -> usize {
        let (width, height) = self.pixels.dimensions();
        (width as usize) * (height as usize)
    }

    /// Bits needed to hide `data` under `sequence`, metadata and marker included.
    pub fn required_bits(data: &[u8], sequence: &ClickSequence) -> Result<usize, StegoError> {
        Ok(payload::bitstream_len(&payload::frame(data, sequence)?))
    }

    /// Returns the underlying RGBA buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consumes self and returns the underlying RGBA buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Hides `data` behind `sequence`, returning a new carrier.
    ///
    /// Fails with [`StegoError::CapacityExceeded`] instead of truncating when
    /// the carrier has fewer pixels than the bitstream has bits, and with
    /// [`StegoError::MarkerInPayload`] when the data itself spells the end
    /// marker and could never be read back whole.
    pub fn hide(&self, data: &[u8], sequence: &ClickSequence) -> Result<Self, StegoError> {
        let framed = payload::frame(data, sequence)?;
        let needed = payload::bitstream_len(&framed);
        let capacity = self.capacity_bits();
        if needed > capacity {
            return Err(StegoError::CapacityExceeded { needed, capacity });
        }
        // Extraction stops at the first marker, so it must be the appended one
        if let Some(bit) = payload::marker_end(payload::bitstream(&framed)) {
            if bit + 1 != needed {
                return Err(StegoError::MarkerInPayload { bit });
            }
        }

        let mut output = self.pixels.clone();
        for (pixel, bit) in output
            .chunks_exact_mut(PIXEL_STRIDE)
            .zip(payload::bitstream(&framed))
        {
            // Clear LSB and set new bit
            pixel[RED] = (pixel[RED] & 0xFE) | bit;
        }

        tracing::debug!(bits = needed, capacity, "payload embedded");
        Ok(Self { pixels: output })
    }

    /// Extracts the data hidden behind `sequence`.
    pub fn extract(&self, sequence: &ClickSequence) -> Result<Vec<u8>, StegoError> {
        let bits = self.read_until_marker()?;
        let framed = payload::pack_bits(&bits[..bits.len() - END_MARKER_BITS]);

        let (metadata, data) = payload::unframe(&framed)?;

        if !sequence.matches(&metadata.click_sequence) {
            return Err(StegoError::SequenceMismatch);
        }

        tracing::debug!(bytes = data.len(), "payload extracted");
        Ok(data.to_vec())
    }

    /// Reads red-channel LSBs until the accumulated bits end with the marker.
    fn read_until_marker(&self) -> Result<Vec<u8>, StegoError> {
        let mut bits = Vec::new();
        let mut window: u16 = 0;

        for pixel in self
            .pixels
            .chunks_exact(PIXEL_STRIDE)
            .take(self.capacity_bits())
        {
            let bit = pixel[RED] & 1;
            bits.push(bit);
            window = (window << 1) | u16::from(bit);

            if bits.len() >= END_MARKER_BITS && window == END_MARKER {
                return Ok(bits);
            }
        }

        Err(StegoError::NoEndMarker)
    }

    /// Encodes the carrier as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| StegoError::ImageSaveError(e.to_string()))?;
        Ok(bytes)
    }

    /// Saves the carrier to a PNG file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        self.pixels
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| StegoError::ImageSaveError(e.to_string()))
    }
}

//! Framing of the hidden payload.
//!
//! Format: `metadata JSON` || `|` || `data`, then every byte as 8 bits
//! (high bit first), then the 16-bit end marker `1111111111111110`.

use serde::{Deserialize, Serialize};

use super::StegoError;
use crate::sequence::ClickSequence;

/// End-of-stream sentinel appended after the payload bits.
pub const END_MARKER: u16 = 0b1111_1111_1111_1110;

/// Width of the end marker in bits.
pub const END_MARKER_BITS: usize = 16;

/// Separator between metadata and data. The metadata JSON never contains it.
pub const SEPARATOR: u8 = b'|';

/// Metadata embedded in front of the data.
///
/// Parsing is strict (unknown fields rejected, length must match) so that a
/// flipped bit anywhere in the metadata fails extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StegoMetadata {
    /// Click sequence recorded at hide time, compared verbatim on extraction.
    pub click_sequence: Vec<i64>,
    /// Length of the data after the separator, in bytes.
    #[serde(alias = "textLength")]
    pub data_length: usize,
}

impl StegoMetadata {
    pub fn new(sequence: &ClickSequence, data_length: usize) -> Self {
        Self {
            click_sequence: (*sequence).into(),
            data_length,
        }
    }
}

/// Builds `metadata || '|' || data`.
pub fn frame(data: &[u8], sequence: &ClickSequence) -> Result<Vec<u8>, StegoError> {
    let metadata = serde_json::to_vec(&StegoMetadata::new(sequence, data.len()))
        .map_err(|e| StegoError::MalformedMetadata(e.to_string()))?;

    let mut framed = Vec::with_capacity(metadata.len() + 1 + data.len());
    framed.extend_from_slice(&metadata);
    framed.push(SEPARATOR);
    framed.extend_from_slice(data);
    Ok(framed)
}

/// Splits a recovered frame at the first separator and parses the metadata.
pub fn unframe(framed: &[u8]) -> Result<(StegoMetadata, &[u8]), StegoError> {
    let split = framed
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or(StegoError::MalformedPayload)?;

    let metadata: StegoMetadata = serde_json::from_slice(&framed[..split])
        .map_err(|e| StegoError::MalformedMetadata(e.to_string()))?;

    let data = &framed[split + 1..];
    if metadata.data_length != data.len() {
        return Err(StegoError::MalformedMetadata(format!(
            "data length {} does not match recovered {} bytes",
            metadata.data_length,
            data.len()
        )));
    }

    Ok((metadata, data))
}

/// Total bits needed to embed `framed`, marker included.
pub fn bitstream_len(framed: &[u8]) -> usize {
    framed.len() * 8 + END_MARKER_BITS
}

/// Bits of `framed` (high bit first) followed by the end marker.
pub fn bitstream(framed: &[u8]) -> impl Iterator<Item = u8> + '_ {
    let data_bits = framed
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1));
    let marker_bits = (0..END_MARKER_BITS)
        .rev()
        .map(|i| ((END_MARKER >> i) & 1) as u8);
    data_bits.chain(marker_bits)
}

/// Bit index at which the end marker first completes in `bits`, if anywhere.
pub fn marker_end(bits: impl IntoIterator<Item = u8>) -> Option<usize> {
    let mut window: u16 = 0;
    for (index, bit) in bits.into_iter().enumerate() {
        window = (window << 1) | u16::from(bit);
        if index + 1 >= END_MARKER_BITS && window == END_MARKER {
            return Some(index);
        }
    }
    None
}

/// Packs a bit slice into bytes, high bit first. A trailing partial byte is dropped.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | bit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq() -> ClickSequence {
        ClickSequence::new([1, 5, 9, 3]).unwrap()
    }

    #[test]
    fn test_frame_layout() {
        let framed = frame(b"abc", &seq()).unwrap();
        assert_eq!(
            framed,
            br#"{"clickSequence":[1,5,9,3],"dataLength":3}|abc"#.to_vec()
        );
    }

    #[test]
    fn test_unframe_splits_at_first_separator() {
        let framed = frame(b"a|b|c", &seq()).unwrap();
        let (metadata, data) = unframe(&framed).unwrap();

        assert_eq!(metadata, StegoMetadata::new(&seq(), 5));
        assert_eq!(data, b"a|b|c");
    }

    #[test]
    fn test_unframe_accepts_legacy_text_length() {
        let (metadata, data) =
            unframe(br#"{"clickSequence":[2,4,6,8],"textLength":2}|hi"#).unwrap();
        assert_eq!(metadata.click_sequence, vec![2, 4, 6, 8]);
        assert_eq!(metadata.data_length, 2);
        assert_eq!(data, b"hi");
    }

    #[test]
    fn test_unframe_without_separator() {
        assert!(matches!(
            unframe(br#"{"clickSequence":[1,5,9,3],"dataLength":0}"#),
            Err(StegoError::MalformedPayload)
        ));
    }

    #[test]
    fn test_unframe_length_mismatch() {
        assert!(matches!(
            unframe(br#"{"clickSequence":[1,5,9,3],"dataLength":4}|abc"#),
            Err(StegoError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn test_unframe_rejects_unknown_fields() {
        assert!(matches!(
            unframe(br#"{"clickSequence":[1,5,9,3],"dataLengti":3}|abc"#),
            Err(StegoError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn test_unframe_bad_metadata() {
        assert!(matches!(
            unframe(b"not json|data"),
            Err(StegoError::MalformedMetadata(_))
        ));
        assert!(matches!(
            unframe(br#"{"clickSequence":"1593","dataLength":4}|data"#),
            Err(StegoError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn test_bitstream_is_msb_first_with_marker() {
        let bits: Vec<u8> = bitstream(&[0b1010_0001]).collect();
        assert_eq!(bits.len(), bitstream_len(&[0]));
        assert_eq!(&bits[..8], &[1, 0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(&bits[8..], &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_marker_end_finds_first_occurrence() {
        let framed = frame(b"ok", &seq()).unwrap();
        assert_eq!(marker_end(bitstream(&framed)), Some(bitstream_len(&framed) - 1));

        // 0xFF 0xFE spells the marker inside the data
        assert_eq!(marker_end(bitstream(&[0x41, 0xFF, 0xFE, 0x42])), Some(23));
        assert_eq!(marker_end([1u8; 15]), None);
    }

    #[test]
    fn test_pack_bits_drops_partial_byte() {
        let bits = [0, 1, 0, 0, 1, 0, 0, 0, 1, 1, 1];
        assert_eq!(pack_bits(&bits), vec![b'H']);
    }
}

//! The three-layer pipeline.
//!
//! Encrypt: Symmetric → Hybrid → Steganography
//! Decrypt: Steganography → Hybrid → Symmetric
//!
//! Stages run strictly in order and fail closed: any stage error aborts the
//! whole operation and nothing is returned.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, debug_span, info};
use zeroize::Zeroizing;

use crate::crypto::symmetric::{CIPHER_BLOCK_SIZE, IV_SIZE, SALT_SIZE};
use crate::crypto::{self, CryptoError, HybridCiphertext, DEFAULT_RSA_BITS, PBKDF2_ITERATIONS};
use crate::sequence::{ClickSequence, SequenceError};
use crate::stego::{CarrierImage, StegoError};

/// Errors for missing or malformed caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Private key cannot be empty")]
    EmptyPrivateKey,

    #[error("{0}")]
    InvalidSequence(#[from] SequenceError),

    #[error("Unreadable image: {0}")]
    InvalidImage(String),
}

/// Errors surfaced by the pipeline, one variant per failure kind.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Steganography error: {0}")]
    Steganography(StegoError),

    #[error("Capacity error: payload needs {needed} bits but the carrier holds {capacity}")]
    Capacity { needed: usize, capacity: usize },
}

impl From<StegoError> for PipelineError {
    fn from(err: StegoError) -> Self {
        match err {
            StegoError::CapacityExceeded { needed, capacity } => {
                Self::Capacity { needed, capacity }
            }
            other => Self::Steganography(other),
        }
    }
}

impl From<SequenceError> for PipelineError {
    fn from(err: SequenceError) -> Self {
        Self::Validation(err.into())
    }
}

/// Pipeline parameters.
///
/// The defaults are the interoperable values. Anything else produces
/// artifacts that default-configured peers cannot open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// RSA modulus size for the one-time key pair.
    pub rsa_bits: usize,
    /// PBKDF2 iterations for both symmetric layers.
    pub kdf_iterations: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rsa_bits: DEFAULT_RSA_BITS,
            kdf_iterations: PBKDF2_ITERATIONS,
        }
    }
}

/// Direction of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Symmetric,
    Hybrid,
    Steganography,
}

impl Stage {
    /// Stages in execution order for `direction`.
    pub fn order(direction: Direction) -> [Stage; 3] {
        match direction {
            Direction::Encrypt => [Stage::Symmetric, Stage::Hybrid, Stage::Steganography],
            Direction::Decrypt => [Stage::Steganography, Stage::Hybrid, Stage::Symmetric],
        }
    }

    /// 1-based position of this stage when running in `direction`.
    pub fn step(self, direction: Direction) -> usize {
        match (self, direction) {
            (Stage::Symmetric, Direction::Encrypt) => 1,
            (Stage::Hybrid, _) => 2,
            (Stage::Steganography, Direction::Encrypt) => 3,
            (Stage::Steganography, Direction::Decrypt) => 1,
            (Stage::Symmetric, Direction::Decrypt) => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Symmetric => "AES-256",
            Stage::Hybrid => "RSA-OAEP",
            Stage::Steganography => "Steganography",
        };
        f.write_str(name)
    }
}

/// Output of [`encrypt`]: the stego image and the key that opens it.
pub struct EncryptedArtifact {
    /// PNG bytes of the carrier with the payload hidden inside.
    pub image_png: Vec<u8>,
    /// PKCS#8 PEM of the one-time private key. The only durable secret.
    pub private_key_pem: Zeroizing<String>,
}

impl fmt::Debug for EncryptedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedArtifact")
            .field("image_png", &format_args!("{} bytes", self.image_png.len()))
            .field("private_key_pem", &"[REDACTED]")
            .finish()
    }
}

fn require(value: &str, err: ValidationError) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

/// Length of a symmetric blob sealing `n` plaintext bytes (PKCS#7 always pads).
fn sealed_len(n: usize) -> usize {
    SALT_SIZE + IV_SIZE + (n / CIPHER_BLOCK_SIZE + 1) * CIPHER_BLOCK_SIZE
}

fn base64_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}

/// Exact number of carrier bits an encryption of `text` will occupy.
///
/// Every ciphertext size in the pipeline is determined by the input length
/// and the RSA modulus, so this runs no crypto.
pub fn required_bits(
    text: &str,
    sequence: &ClickSequence,
    config: &PipelineConfig,
) -> Result<usize, PipelineError> {
    let c1_len = base64_len(sealed_len(text.len()));
    let wrapped_key_len = base64_len(config.rsa_bits.div_ceil(8));
    let payload_len = base64_len(sealed_len(c1_len));
    // {"key":"…","data":"…"}
    let c2_len = r#"{"key":"","data":""}"#.len() + wrapped_key_len + payload_len;

    Ok(CarrierImage::required_bits(&vec![0; c2_len], sequence)?)
}

/// Encrypts `text` into `carrier` with default parameters and the OS random source.
pub fn encrypt(
    text: &str,
    password: &str,
    carrier: &CarrierImage,
    sequence: &[i64],
) -> Result<EncryptedArtifact, PipelineError> {
    encrypt_with_config(
        text,
        password,
        carrier,
        sequence,
        &PipelineConfig::default(),
        &mut OsRng,
    )
}

/// Encrypts `text` into `carrier`.
pub fn encrypt_with_config<R: CryptoRng + RngCore>(
    text: &str,
    password: &str,
    carrier: &CarrierImage,
    sequence: &[i64],
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<EncryptedArtifact, PipelineError> {
    let sequence = ClickSequence::from_values(sequence)?;
    require(text, ValidationError::EmptyText)?;
    require(password, ValidationError::EmptyPassword)?;

    let direction = Direction::Encrypt;

    let c1 = debug_span!("stage", name = %Stage::Symmetric).in_scope(|| {
        let c1 = crypto::encrypt_text_with_rng(text, password, config.kdf_iterations, rng);
        debug!(step = Stage::Symmetric.step(direction), bytes = c1.len(), "stage complete");
        c1
    });

    let (c2, private_key_pem) = debug_span!("stage", name = %Stage::Hybrid).in_scope(
        || -> Result<_, PipelineError> {
            let sealed = crypto::encrypt_hybrid_with_rng(
                c1.as_bytes(),
                config.rsa_bits,
                config.kdf_iterations,
                rng,
            )
            .map_err(CryptoError::from)?;
            let pem = crypto::encode_private_key_pem(&sealed.private_key)
                .map_err(CryptoError::from)?;
            let c2 = sealed.ciphertext.to_json().map_err(CryptoError::from)?;
            debug!(step = Stage::Hybrid.step(direction), bytes = c2.len(), "stage complete");
            Ok((c2, pem))
        },
    )?;

    let image_png = debug_span!("stage", name = %Stage::Steganography).in_scope(
        || -> Result<_, PipelineError> {
            let stego = carrier.hide(c2.as_bytes(), &sequence)?;
            let png = stego.to_png_bytes()?;
            debug!(
                step = Stage::Steganography.step(direction),
                bytes = png.len(),
                "stage complete"
            );
            Ok(png)
        },
    )?;

    info!(sequence_len = sequence.cells().len(), "encryption pipeline complete");
    Ok(EncryptedArtifact {
        image_png,
        private_key_pem,
    })
}

/// Decrypts the text hidden in lossless image bytes, with default parameters.
pub fn decrypt(
    image_bytes: &[u8],
    password: &str,
    private_key_pem: &str,
    sequence: &[i64],
) -> Result<String, PipelineError> {
    decrypt_with_config(
        image_bytes,
        password,
        private_key_pem,
        sequence,
        &PipelineConfig::default(),
    )
}

/// Decrypts the text hidden in lossless image bytes.
pub fn decrypt_with_config(
    image_bytes: &[u8],
    password: &str,
    private_key_pem: &str,
    sequence: &[i64],
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    // Validate cheap inputs before paying for image decoding
    let sequence = validate_decrypt_inputs(password, private_key_pem, sequence)?;

    let carrier = CarrierImage::from_bytes(image_bytes)
        .map_err(|e| ValidationError::InvalidImage(e.to_string()))?;
    run_decrypt(&carrier, password, private_key_pem, &sequence, config)
}

fn validate_decrypt_inputs(
    password: &str,
    private_key_pem: &str,
    sequence: &[i64],
) -> Result<ClickSequence, PipelineError> {
    let sequence = ClickSequence::from_values(sequence)?;
    require(password, ValidationError::EmptyPassword)?;
    require(private_key_pem.trim(), ValidationError::EmptyPrivateKey)?;
    Ok(sequence)
}

/// Decrypts the text hidden in an already-decoded carrier.
pub fn decrypt_carrier(
    carrier: &CarrierImage,
    password: &str,
    private_key_pem: &str,
    sequence: &[i64],
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let sequence = validate_decrypt_inputs(password, private_key_pem, sequence)?;
    run_decrypt(carrier, password, private_key_pem, &sequence, config)
}

/// Runs the decrypt stages on inputs that have already been validated.
fn run_decrypt(
    carrier: &CarrierImage,
    password: &str,
    private_key_pem: &str,
    sequence: &ClickSequence,
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let direction = Direction::Decrypt;

    let c2_raw = debug_span!("stage", name = %Stage::Steganography).in_scope(
        || -> Result<_, PipelineError> {
            let raw = carrier.extract(sequence)?;
            debug!(
                step = Stage::Steganography.step(direction),
                bytes = raw.len(),
                "stage complete"
            );
            Ok(raw)
        },
    )?;

    let c1 = debug_span!("stage", name = %Stage::Hybrid).in_scope(
        || -> Result<_, CryptoError> {
            let private_key = crypto::decode_private_key_pem(private_key_pem)?;
            let c2 = HybridCiphertext::from_json(&c2_raw)?;
            let c1 = crypto::decrypt_hybrid_with_iterations(
                &c2,
                &private_key,
                config.kdf_iterations,
            )?;
            debug!(step = Stage::Hybrid.step(direction), bytes = c1.len(), "stage complete");
            Ok(c1)
        },
    )?;

    let text = debug_span!("stage", name = %Stage::Symmetric).in_scope(
        || -> Result<_, CryptoError> {
            let encoded = std::str::from_utf8(&c1)
                .map_err(|_| crypto::SymmetricError::InvalidUtf8)?;
            let text = crypto::decrypt_text(encoded, password, config.kdf_iterations)?;
            debug!(step = Stage::Symmetric.step(direction), "stage complete");
            Ok(text)
        },
    )?;

    info!("decryption pipeline complete");
    Ok(text)
}

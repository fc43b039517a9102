//! # Layerveil - layered text protection
//!
//! Layerveil protects a short text with three independent layers and hides
//! the result inside an ordinary image.
//!
//! ## Overview
//!
//! Encryption runs three stages in order:
//! 1. **Symmetric**: the text is encrypted with a password
//!    (PBKDF2-HMAC-SHA256 + AES-256-CBC, salted, random IV)
//! 2. **Hybrid**: the result is encrypted again under a fresh random key,
//!    which is itself wrapped with a one-time RSA-OAEP key pair
//! 3. **Steganography**: the hybrid record is hidden in the red-channel LSBs
//!    of a carrier image, behind a 4-cell click sequence on a 3×3 grid
//!
//! Decryption runs the same stages in reverse.
//!
//! ## Security Model
//!
//! - **Three factors**: password + private key + click sequence
//! - **One-time keys**: every encryption generates a new RSA key pair; the
//!   private key PEM is the only durable secret the caller receives
//! - **Fail closed**: any stage failure aborts with a typed error; no partial
//!   plaintext is ever returned
//! - **Lossless only**: the stego image is PNG; any lossy re-encoding destroys
//!   the payload
//!
//! The click sequence is a gate, not a key. The payload bits are stored in
//! plain order and the sequence is compared against embedded metadata, so it
//! adds no secrecy against someone who can read the image.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use layerveil::stego::CarrierImage;
//! use layerveil::{decrypt, encrypt};
//!
//! let carrier = CarrierImage::from_file("photo.png").unwrap();
//! let sequence = [1, 5, 9, 3];
//!
//! let artifact = encrypt("HELLO", "Secr3t!", &carrier, &sequence).unwrap();
//!
//! // Share artifact.image_png; keep artifact.private_key_pem safe
//! let text = decrypt(
//!     &artifact.image_png,
//!     "Secr3t!",
//!     &artifact.private_key_pem,
//!     &sequence,
//! )
//! .unwrap();
//! assert_eq!(text, "HELLO");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: Symmetric layer, RSA key handling, hybrid layer
//! - [`sequence`]: Click sequence validation
//! - [`stego`]: LSB image steganography with embedded metadata
//! - [`pipeline`]: The three-stage encrypt/decrypt orchestration

pub mod crypto;
pub mod pipeline;
pub mod sequence;
pub mod stego;

// Re-export commonly used types at the crate root
pub use crypto::{CryptoError, KeyPair};
pub use pipeline::{
    decrypt, decrypt_carrier, decrypt_with_config, encrypt, encrypt_with_config, required_bits,
    Direction, EncryptedArtifact, PipelineConfig, PipelineError, Stage, ValidationError,
};
pub use sequence::{validate, ClickSequence, SequenceError};
pub use stego::{CarrierImage, StegoError};

//! Cryptographic operations for Layerveil.
//!
//! This module provides:
//! - Symmetric encryption with passphrase (PBKDF2 + AES-256-CBC)
//! - RSA key generation and PEM handling
//! - Hybrid encryption (RSA-OAEP key wrapping + symmetric layer)

pub mod hybrid;
pub mod keys;
pub mod symmetric;

pub use hybrid::{
    decrypt_hybrid, decrypt_hybrid_with_iterations, encrypt_hybrid, encrypt_hybrid_with_rng,
    HybridCiphertext, HybridError, HybridSealed,
};
pub use keys::{
    decode_private_key_pem, encode_private_key_pem, load_private_key, sanitize_pem, KeyError,
    KeyPair, DEFAULT_RSA_BITS,
};
pub use symmetric::{
    decrypt_symmetric, decrypt_symmetric_with_iterations, decrypt_text, encrypt_symmetric,
    encrypt_symmetric_with_rng, encrypt_text_with_rng, SymmetricError, PBKDF2_ITERATIONS,
};

use thiserror::Error;

/// Any failure of the cryptographic layers.
///
/// Wrong passphrase, wrong private key and corrupt ciphertext all land here;
/// CBC carries no integrity tag, so they cannot be told apart reliably.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Symmetric layer: {0}")]
    Symmetric(#[from] SymmetricError),

    #[error("Hybrid layer: {0}")]
    Hybrid(#[from] HybridError),

    #[error("Key: {0}")]
    Key(#[from] KeyError),
}

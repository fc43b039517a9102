//! Hybrid encryption: RSA-OAEP key wrapping over the symmetric layer.
//!
//! RSA cannot encrypt arbitrary-length data, so each call:
//! 1. Generates a fresh RSA key pair (one-time use)
//! 2. Generates a random 256-bit symmetric key, hex-encoded as text
//! 3. Wraps that key text with RSA-OAEP (SHA-1 / MGF1-SHA-1)
//! 4. Encrypts the payload with the symmetric layer, using the key text as passphrase
//! 5. Discards the public key and returns the private key to the caller

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::{Oaep, RsaPrivateKey};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use thiserror::Error;
use zeroize::Zeroizing;

use super::keys::{KeyError, KeyPair, DEFAULT_RSA_BITS};
use super::symmetric::{self, SymmetricError, PBKDF2_ITERATIONS};

/// Random bytes behind each symmetric key string (256 bits of entropy).
const SYMMETRIC_KEY_BYTES: usize = 32;

/// Errors that can occur during hybrid encryption.
#[derive(Error, Debug)]
pub enum HybridError {
    #[error("Key error: {0}")]
    KeyError(#[from] KeyError),

    #[error("Key wrapping failed: {0}")]
    WrapFailed(String),

    #[error("Key unwrapping failed (wrong private key or corrupt data)")]
    UnwrapFailed,

    #[error("Unwrapped key material is not a valid key string")]
    InvalidKeyMaterial,

    #[error("Symmetric layer error: {0}")]
    SymmetricError(#[from] SymmetricError),

    #[error("Invalid base64: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Malformed hybrid record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

/// Wire record produced by the hybrid layer.
///
/// Serialized as JSON: `{"key": <base64 wrapped key>, "data": <base64 symmetric blob>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridCiphertext {
    /// RSA-OAEP encryption of the symmetric key string, base64.
    #[serde(rename = "key")]
    pub wrapped_key: String,
    /// Symmetric ciphertext of the payload under the key string, base64.
    #[serde(rename = "data")]
    pub payload: String,
}

impl HybridCiphertext {
    /// Serializes the record to its JSON wire form.
    pub fn to_json(&self) -> Result<String, HybridError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the record from its JSON wire form.
    pub fn from_json(data: &[u8]) -> Result<Self, HybridError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Result of hybrid encryption: the record plus the only key that opens it.
pub struct HybridSealed {
    pub ciphertext: HybridCiphertext,
    pub private_key: RsaPrivateKey,
}

impl std::fmt::Debug for HybridSealed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSealed")
            .field("ciphertext", &self.ciphertext)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn oaep() -> Oaep {
    Oaep::new::<Sha1>()
}

/// Encrypts `plaintext` under a freshly generated 2048-bit key pair.
pub fn encrypt_hybrid(plaintext: &[u8]) -> Result<HybridSealed, HybridError> {
    encrypt_hybrid_with_rng(plaintext, DEFAULT_RSA_BITS, PBKDF2_ITERATIONS, &mut OsRng)
}

/// Encrypts `plaintext` with an explicit key size, KDF strength and random source.
pub fn encrypt_hybrid_with_rng<R: CryptoRng + RngCore>(
    plaintext: &[u8],
    rsa_bits: usize,
    kdf_iterations: u32,
    rng: &mut R,
) -> Result<HybridSealed, HybridError> {
    let keypair = KeyPair::generate_with_rng(rsa_bits, rng)?;

    let mut key_bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_BYTES]);
    rng.fill_bytes(key_bytes.as_mut_slice());
    let key_string = Zeroizing::new(hex::encode(key_bytes.as_slice()));

    let wrapped = keypair
        .public_key()
        .encrypt(rng, oaep(), key_string.as_bytes())
        .map_err(|e| HybridError::WrapFailed(e.to_string()))?;

    let payload =
        symmetric::encrypt_symmetric_with_rng(plaintext, &key_string, kdf_iterations, rng);

    Ok(HybridSealed {
        ciphertext: HybridCiphertext {
            wrapped_key: BASE64.encode(wrapped),
            payload: BASE64.encode(payload),
        },
        private_key: keypair.into_private_key(),
    })
}

/// Decrypts a hybrid record with the matching private key.
pub fn decrypt_hybrid(
    ciphertext: &HybridCiphertext,
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, HybridError> {
    decrypt_hybrid_with_iterations(ciphertext, private_key, PBKDF2_ITERATIONS)
}

/// Decrypts a hybrid record with an explicit KDF strength.
pub fn decrypt_hybrid_with_iterations(
    ciphertext: &HybridCiphertext,
    private_key: &RsaPrivateKey,
    kdf_iterations: u32,
) -> Result<Vec<u8>, HybridError> {
    let wrapped = BASE64.decode(ciphertext.wrapped_key.trim())?;
    let payload = BASE64.decode(ciphertext.payload.trim())?;

    let key_bytes = Zeroizing::new(
        private_key
            .decrypt(oaep(), &wrapped)
            .map_err(|_| HybridError::UnwrapFailed)?,
    );
    let key_string =
        std::str::from_utf8(&key_bytes).map_err(|_| HybridError::InvalidKeyMaterial)?;
    if key_string.is_empty() {
        return Err(HybridError::InvalidKeyMaterial);
    }

    Ok(symmetric::decrypt_symmetric_with_iterations(
        &payload,
        key_string,
        kdf_iterations,
    )?)
}

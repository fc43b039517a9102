//! Symmetric encryption with passphrase for Layerveil.
//!
//! This module provides passphrase-based symmetric encryption using:
//! - PBKDF2-HMAC-SHA256 (10,000 iterations) for key derivation
//! - AES-256-CBC with PKCS#7 padding for encryption
//!
//! There is no authentication tag. A wrong passphrase yields either a
//! padding failure or garbage bytes; callers treat both as decryption failure.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Salt size prepended to every blob.
pub const SALT_SIZE: usize = 16;

/// IV size, equal to the AES block size.
pub const IV_SIZE: usize = 16;

/// AES block size.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Derived key size (AES-256).
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count. Changing it breaks every existing artifact.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

const HEADER_SIZE: usize = SALT_SIZE + IV_SIZE;

/// Errors that can occur during symmetric encryption.
#[derive(Error, Debug)]
pub enum SymmetricError {
    #[error("Decryption failed: invalid padding (wrong passphrase or corrupt data)")]
    InvalidPadding,

    #[error("Invalid ciphertext: too short ({0} bytes)")]
    CiphertextTooShort(usize),

    #[error("Invalid ciphertext: {0} bytes is not a multiple of the block size")]
    UnalignedCiphertext(usize),

    #[error("Invalid base64: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Decrypted data is not valid UTF-8")]
    InvalidUtf8,
}

/// Derives a 256-bit key from a passphrase and salt.
fn derive_key(passphrase: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key[..]);
    key
}

/// Encrypts data using a passphrase.
///
/// The output format is: salt (16 bytes) || iv (16 bytes) || ciphertext (padded)
pub fn encrypt_symmetric(plaintext: &[u8], passphrase: &str) -> Vec<u8> {
    encrypt_symmetric_with_rng(plaintext, passphrase, PBKDF2_ITERATIONS, &mut OsRng)
}

/// Encrypts data using a passphrase, drawing salt and IV from `rng`.
pub fn encrypt_symmetric_with_rng<R: CryptoRng + RngCore>(
    plaintext: &[u8],
    passphrase: &str,
    iterations: u32,
    rng: &mut R,
) -> Vec<u8> {
    let mut salt = [0u8; SALT_SIZE];
    rng.fill_bytes(&mut salt);
    let key = derive_key(passphrase, &salt, iterations);

    let mut iv = [0u8; IV_SIZE];
    rng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new(GenericArray::from_slice(&key[..]), GenericArray::from_slice(&iv));
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut result = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    result.extend_from_slice(&salt);
    result.extend_from_slice(&iv);
    result.extend_from_slice(&ciphertext);
    result
}

/// Decrypts data using a passphrase.
///
/// Expects input format: salt (16 bytes) || iv (16 bytes) || ciphertext (padded)
pub fn decrypt_symmetric(data: &[u8], passphrase: &str) -> Result<Vec<u8>, SymmetricError> {
    decrypt_symmetric_with_iterations(data, passphrase, PBKDF2_ITERATIONS)
}

/// Decrypts data using a passphrase and an explicit PBKDF2 iteration count.
pub fn decrypt_symmetric_with_iterations(
    data: &[u8],
    passphrase: &str,
    iterations: u32,
) -> Result<Vec<u8>, SymmetricError> {
    // Minimum: header + one padded block
    if data.len() < HEADER_SIZE + CIPHER_BLOCK_SIZE {
        return Err(SymmetricError::CiphertextTooShort(data.len()));
    }

    let (header, ciphertext) = data.split_at(HEADER_SIZE);
    if ciphertext.len() % CIPHER_BLOCK_SIZE != 0 {
        return Err(SymmetricError::UnalignedCiphertext(ciphertext.len()));
    }
    let (salt, iv) = header.split_at(SALT_SIZE);

    let key = derive_key(passphrase, salt, iterations);

    Aes256CbcDec::new(GenericArray::from_slice(&key[..]), GenericArray::from_slice(iv))
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| SymmetricError::InvalidPadding)
}

/// Encrypts text and returns the base64 wire form `base64(salt || iv || ciphertext)`.
pub fn encrypt_text_with_rng<R: CryptoRng + RngCore>(
    plaintext: &str,
    passphrase: &str,
    iterations: u32,
    rng: &mut R,
) -> String {
    BASE64.encode(encrypt_symmetric_with_rng(
        plaintext.as_bytes(),
        passphrase,
        iterations,
        rng,
    ))
}

/// Decrypts the base64 wire form back into text.
pub fn decrypt_text(
    encoded: &str,
    passphrase: &str,
    iterations: u32,
) -> Result<String, SymmetricError> {
    let data = BASE64.decode(encoded.trim())?;
    let plaintext = decrypt_symmetric_with_iterations(&data, passphrase, iterations)?;
    String::from_utf8(plaintext).map_err(|_| SymmetricError::InvalidUtf8)
}

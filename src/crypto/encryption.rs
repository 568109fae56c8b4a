//! # Authenticated Encryption
//!
//! AES-256-GCM with random 96-bit nonces and 128-bit authentication tags.
//!
//! Every encryption generates a fresh random nonce; nonce reuse with the
//! same key would break both confidentiality and authenticity, so keys
//! derived here are only ever used with nonces produced by
//! [`Nonce::random`]. Decryption failure is authenticated failure: a
//! wrong key, wrong nonce, or any ciphertext tampering all surface as the
//! same opaque error.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
#[derive(Clone, Copy, Debug)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 12 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; NONCE_SIZE] = slice.try_into().map_err(|_| {
            Error::SerializationError(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM encryption key, zeroized on drop
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Encrypt `plaintext`, returning the fresh nonce and the ciphertext
/// (authentication tag included).
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random();
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("invalid key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    Ok((nonce, ciphertext))
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// Fails with [`Error::DecryptionFailed`] on any tampering, wrong key,
/// or wrong nonce; the causes are not distinguished.
pub fn decrypt(key: &EncryptionKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| Error::DecryptionFailed)?;

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
        .map_err(|_| Error::DecryptionFailed)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let plaintext = b"hello, world";

        let (nonce, ciphertext) = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (nonce, ciphertext) = encrypt(&key, b"").unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();

        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (nonce, mut ciphertext) = encrypt(&key, b"hello").unwrap();
        ciphertext[0] ^= 0xFF;

        assert!(matches!(
            decrypt(&key, &nonce, &ciphertext),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = EncryptionKey::from_bytes([42u8; 32]);
        let key2 = EncryptionKey::from_bytes([99u8; 32]);

        let (nonce, ciphertext) = encrypt(&key1, b"hello").unwrap();
        assert!(decrypt(&key2, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (n1, c1) = encrypt(&key, b"hello").unwrap();
        let (n2, c2) = encrypt(&key, b"hello").unwrap();

        assert_ne!(n1.as_bytes(), n2.as_bytes());
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_nonce_from_slice_rejects_bad_length() {
        assert!(Nonce::from_slice(&[0u8; 11]).is_err());
        assert!(Nonce::from_slice(&[0u8; 12]).is_ok());
    }
}

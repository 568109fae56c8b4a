//! # Digital Signatures
//!
//! Ed25519 signatures over arbitrary byte messages.
//!
//! ## Properties
//!
//! | Property | Description |
//! |----------|-------------|
//! | Authenticity | Verifies the message came from the claimed signer |
//! | Integrity | Detects any modification to the signed message |
//! | Public Verification | Anyone with the signing public key can verify |
//! | Deterministic | Same key + message always produce the same signature |
//!
//! Verification is stateless: it needs only the signing half of the
//! target identity, never the verifier's own keys, so third-party
//! signatures can be checked by anyone.

use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::crypto::SigningKeyPair;
use crate::error::{Error, Result};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// An Ed25519 digital signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_bytes")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 64 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != SIGNATURE_SIZE {
            return Err(Error::SerializationError(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_SIZE,
                slice.len()
            )));
        }
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Encode as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::SerializationError(format!("invalid signature hex: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message with the given keypair.
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a signing public key.
///
/// Returns `Ok(false)` for a well-formed but invalid signature; errors
/// only when the public key itself is malformed.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &Signature) -> Result<bool> {
    let key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Error::InvalidIdentity(format!("invalid signing public key: {}", e)))?;
    let sig = Ed25519Signature::from_bytes(signature.as_bytes());
    Ok(key.verify(message, &sig).is_ok())
}

/// Serde helper for serializing 64-byte signatures as hex
mod signature_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid signature length"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_round_trip() {
        let keypair = SigningKeyPair::from_seed(&[7u8; 32]);
        let message = b"hello, world";

        let sig = sign(&keypair, message);
        assert!(verify(&keypair.public_bytes(), message, &sig).unwrap());
    }

    #[test]
    fn test_signature_deterministic() {
        let keypair = SigningKeyPair::from_seed(&[7u8; 32]);
        let sig1 = sign(&keypair, b"same message");
        let sig2 = sign(&keypair, b"same message");
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_tampered_message_fails() {
        let keypair = SigningKeyPair::from_seed(&[7u8; 32]);
        let sig = sign(&keypair, b"original");
        assert!(!verify(&keypair.public_bytes(), b"tampered", &sig).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let alice = SigningKeyPair::from_seed(&[1u8; 32]);
        let bob = SigningKeyPair::from_seed(&[2u8; 32]);

        let sig = sign(&alice, b"message");
        assert!(!verify(&bob.public_bytes(), b"message", &sig).unwrap());
    }

    #[test]
    fn test_signature_hex_round_trip() {
        let keypair = SigningKeyPair::from_seed(&[7u8; 32]);
        let sig = sign(&keypair, b"message");

        let restored = Signature::from_hex(&sig.to_hex()).unwrap();
        assert_eq!(sig, restored);
    }

    #[test]
    fn test_signature_from_slice_rejects_bad_length() {
        assert!(Signature::from_slice(&[0u8; 63]).is_err());
    }
}

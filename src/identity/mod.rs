//! # Identity Module
//!
//! The public, shareable identifier for a key bundle.
//!
//! ## Identity Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        IDENTITY FORMAT                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Raw form: 64 bytes                                                    │
//! │  ┌──────────────────────────────┬──────────────────────────────┐       │
//! │  │  signing public key (32 B)   │ encryption public key (32 B) │       │
//! │  │  Ed25519                     │ X25519                       │       │
//! │  └──────────────────────────────┴──────────────────────────────┘       │
//! │                                                                         │
//! │  External form: standard base64 of the 64 raw bytes                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Self-Consistency
//!
//! Parsing decodes leniently (tolerating non-canonical trailing bits and
//! padding), then re-encodes the decoded halves canonically and compares
//! against the input. Any difference means the string was corrupted in
//! transit and fails with [`Error::IdentityMismatch`]: the identity that
//! would result does not match the string the caller presented.

use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Raw identity length: signing pubkey ‖ encryption pubkey
pub const IDENTITY_SIZE: usize = 64;

/// Lenient decoder used only for parsing; encoding is always canonical.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A public identity: signing and encryption public keys, externally
/// represented as one base64 string.
///
/// Contains no secret material; safe to share, transmit, and log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    signing: [u8; 32],
    encryption: [u8; 32],
    encoded: String,
}

impl Identity {
    /// Build an identity from its two public keys.
    pub fn from_public_keys(signing: [u8; 32], encryption: [u8; 32]) -> Self {
        let mut raw = [0u8; IDENTITY_SIZE];
        raw[..32].copy_from_slice(&signing);
        raw[32..].copy_from_slice(&encryption);
        Self {
            signing,
            encryption,
            encoded: STANDARD.encode(raw),
        }
    }

    /// Parse an identity string.
    ///
    /// Structurally undecodable input (bad symbols, wrong length) fails
    /// with [`Error::InvalidIdentity`]; input that decodes but does not
    /// re-encode to itself fails with [`Error::IdentityMismatch`].
    pub fn parse(s: &str) -> Result<Self> {
        let raw = LENIENT
            .decode(s)
            .map_err(|e| Error::InvalidIdentity(format!("not base64: {}", e)))?;

        if raw.len() != IDENTITY_SIZE {
            return Err(Error::InvalidIdentity(format!(
                "expected {} raw bytes, got {}",
                IDENTITY_SIZE,
                raw.len()
            )));
        }

        let mut signing = [0u8; 32];
        let mut encryption = [0u8; 32];
        signing.copy_from_slice(&raw[..32]);
        encryption.copy_from_slice(&raw[32..]);

        let id = Self::from_public_keys(signing, encryption);
        if id.encoded != s {
            return Err(Error::IdentityMismatch);
        }
        Ok(id)
    }

    /// The signing (Ed25519) public key half
    pub fn signing_key(&self) -> &[u8; 32] {
        &self.signing
    }

    /// The encryption (X25519) public key half
    pub fn encryption_key(&self) -> &[u8; 32] {
        &self.encryption
    }

    /// The canonical base64 string form
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoded)
    }
}

impl std::str::FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Identity::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const B64: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    fn sample() -> Identity {
        Identity::from_public_keys([3u8; 32], [7u8; 32])
    }

    #[test]
    fn test_round_trip() {
        let id = sample();
        let parsed = Identity::parse(id.as_str()).unwrap();

        assert_eq!(id, parsed);
        assert_eq!(parsed.signing_key(), &[3u8; 32]);
        assert_eq!(parsed.encryption_key(), &[7u8; 32]);
    }

    #[test]
    fn test_encoded_length() {
        // 64 raw bytes => 88 base64 characters including padding
        assert_eq!(sample().as_str().len(), 88);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = STANDARD.encode([0u8; 32]);
        assert!(matches!(
            Identity::parse(&short),
            Err(Error::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_not_base64_rejected() {
        assert!(matches!(
            Identity::parse("!!! definitely not base64 !!!"),
            Err(Error::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_corrupted_string_fails_with_mismatch() {
        // Flip a padding bit in the final data symbol: the string still
        // decodes to the same 64 bytes, but is no longer the canonical
        // encoding of them.
        let id = sample();
        let mut bytes = id.as_str().as_bytes().to_vec();
        let pos = 85;
        let idx = B64.iter().position(|&b| b == bytes[pos]).unwrap();
        bytes[pos] = B64[idx ^ 1];
        let corrupted = String::from_utf8(bytes).unwrap();

        assert_ne!(corrupted, id.as_str());
        assert!(matches!(
            Identity::parse(&corrupted),
            Err(Error::IdentityMismatch)
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let id = sample();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));

        let restored: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = sample();
        assert_eq!(format!("{}", id), id.as_str());
    }
}

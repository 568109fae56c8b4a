//! # Persistence Blobs
//!
//! Tagged, passphrase-encrypted persistence records for seeds and key
//! bundles.
//!
//! A blob is a JSON-compatible record:
//!
//! ```text
//! { "type": "hcRootSeed" | "hcDeviceSeed" | "hcDevicePinSeed" | "hcKeypair",
//!   "hint": <free-form description>,
//!   "data": <base64 passphrase ciphertext> }
//! ```
//!
//! The tag travels as a plain string so unknown tags survive transport
//! and deserialization; they are rejected by [`BlobType::from_tag`]
//! *before* any decryption work is attempted.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The closed set of recognized persistence tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobType {
    /// A root seed secret
    RootSeed,
    /// A device seed secret
    DeviceSeed,
    /// A pin-derived device seed secret
    DevicePinSeed,
    /// A full keypair (both public and both private keys)
    Keypair,
}

impl BlobType {
    /// The wire tag for this blob type
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RootSeed => "hcRootSeed",
            Self::DeviceSeed => "hcDeviceSeed",
            Self::DevicePinSeed => "hcDevicePinSeed",
            Self::Keypair => "hcKeypair",
        }
    }

    /// Resolve a wire tag; unrecognized tags are a hard error.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "hcRootSeed" => Ok(Self::RootSeed),
            "hcDeviceSeed" => Ok(Self::DeviceSeed),
            "hcDevicePinSeed" => Ok(Self::DevicePinSeed),
            "hcKeypair" => Ok(Self::Keypair),
            other => Err(Error::UnknownBlobType(other.to_string())),
        }
    }
}

impl std::fmt::Display for BlobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A tagged, passphrase-encrypted persistence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceBlob {
    /// Persistence type tag (see [`BlobType`])
    #[serde(rename = "type")]
    pub blob_type: String,

    /// Free-form description to help a human pick the right passphrase
    pub hint: String,

    /// Base64 of the passphrase ciphertext
    pub data: String,
}

impl PersistenceBlob {
    /// Assemble a blob from its parts.
    pub fn new(blob_type: BlobType, hint: impl Into<String>, data: String) -> Self {
        Self {
            blob_type: blob_type.tag().to_string(),
            hint: hint.into(),
            data,
        }
    }

    /// Resolve the type tag, rejecting unrecognized values.
    pub fn type_tag(&self) -> Result<BlobType> {
        BlobType::from_tag(&self.blob_type)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for t in [
            BlobType::RootSeed,
            BlobType::DeviceSeed,
            BlobType::DevicePinSeed,
            BlobType::Keypair,
        ] {
            assert_eq!(BlobType::from_tag(t.tag()).unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = BlobType::from_tag("badBlobType").unwrap_err();
        assert!(matches!(err, Error::UnknownBlobType(t) if t == "badBlobType"));
    }

    #[test]
    fn test_json_field_names() {
        let blob = PersistenceBlob::new(BlobType::RootSeed, "hola", "AAAA".into());
        let json = serde_json::to_string(&blob).unwrap();

        assert!(json.contains("\"type\":\"hcRootSeed\""));
        assert!(json.contains("\"hint\":\"hola\""));
        assert!(json.contains("\"data\":\"AAAA\""));
    }

    #[test]
    fn test_json_round_trip() {
        let blob = PersistenceBlob::new(BlobType::Keypair, "work laptop", "AAECAw==".into());
        let json = serde_json::to_string(&blob).unwrap();
        let restored: PersistenceBlob = serde_json::from_str(&json).unwrap();
        assert_eq!(blob, restored);
    }

    #[test]
    fn test_unknown_tag_survives_deserialization() {
        // Unknown tags must parse as records and only fail at type_tag(),
        // before any decryption is attempted.
        let json = r#"{"type":"mystery","hint":"","data":""}"#;
        let blob: PersistenceBlob = serde_json::from_str(json).unwrap();
        assert!(matches!(blob.type_tag(), Err(Error::UnknownBlobType(_))));
    }
}

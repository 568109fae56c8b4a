//! # Error Handling
//!
//! This module provides the error types for the seedchain core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Seed & Derivation Errors                                          │
//! │  │   ├── InvalidSeedInput      - Not a 32-byte secret or 24-word       │
//! │  │   │                           mnemonic                              │
//! │  │   ├── InvalidIndex          - Derivation index out of range         │
//! │  │   ├── InvalidPin            - Pin shorter than 4 characters         │
//! │  │   └── KeyDerivationFailed   - KDF / password hash failure           │
//! │  │                                                                      │
//! │  ├── Identity & Key Errors                                             │
//! │  │   ├── InvalidIdentity       - Undecodable identity string           │
//! │  │   ├── IdentityMismatch      - Re-encoded identity differs           │
//! │  │   ├── NoPrivateKey          - Public-only bundle asked to sign      │
//! │  │   │                           or decrypt                            │
//! │  │   └── KeyExchangeFailed     - Degenerate Diffie-Hellman result      │
//! │  │                                                                      │
//! │  ├── Persistence Errors                                                │
//! │  │   ├── InvalidHint           - Blob hint rejected                    │
//! │  │   ├── UnknownBlobType       - Unrecognized persistence tag          │
//! │  │   ├── DecryptionFailed      - Wrong passphrase or corrupt data      │
//! │  │   │                           (deliberately indistinguishable)      │
//! │  │   └── SerializationError    - Encoding / decoding failure           │
//! │  │                                                                      │
//! │  ├── Envelope Errors                                                   │
//! │  │   ├── EncryptionFailed      - AEAD encryption failure               │
//! │  │   ├── NotARecipient         - No envelope header slot decrypts      │
//! │  │   └── PayloadDecryptionFailed - Header opened but payload did not   │
//! │  │                                                                      │
//! │  └── Resource Errors                                                   │
//! │      ├── UseAfterDestroy       - Freed secret buffer touched again     │
//! │      └── TaskFailed            - Background crypto task died           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for seedchain core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the seedchain core
///
/// All errors are local, synchronous failures surfaced directly to the
/// caller; nothing is retried internally. A failed derivation or decode
/// never leaves a half-initialized seed or key bundle behind.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Seed & Derivation Errors
    // ========================================================================

    /// Seed construction input was neither a 32-byte secret nor a valid
    /// 24-word mnemonic
    #[error("invalid seed input: {0}")]
    InvalidSeedInput(String),

    /// Derivation index out of range (indexes start at 1)
    #[error("invalid derivation index: {0} (must be >= 1)")]
    InvalidIndex(u32),

    /// Device pin too short
    #[error("pin must be at least 4 characters")]
    InvalidPin,

    /// Key derivation failed
    #[error("failed to derive key: {0}")]
    KeyDerivationFailed(String),

    // ========================================================================
    // Identity & Key Errors
    // ========================================================================

    /// Identity string is structurally invalid (bad encoding or length)
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// Decoding then re-encoding the identity did not reproduce the
    /// supplied string
    #[error("identity string does not round-trip; corrupt identity")]
    IdentityMismatch,

    /// A private key is required for this operation but the bundle only
    /// carries public halves
    #[error("no {0} private key present")]
    NoPrivateKey(&'static str),

    /// Key exchange produced a degenerate shared secret
    #[error("key exchange failed: {0}")]
    KeyExchangeFailed(String),

    // ========================================================================
    // Persistence Errors
    // ========================================================================

    /// Blob hint rejected
    #[error("blob hint rejected: {0}")]
    InvalidHint(String),

    /// Persistence blob carried an unrecognized type tag
    #[error("unrecognized blob type: \"{0}\"")]
    UnknownBlobType(String),

    /// Passphrase decryption failed. Wrong passphrase and corrupt
    /// ciphertext are deliberately not distinguished.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Serialization / deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    // ========================================================================
    // Envelope Errors
    // ========================================================================

    /// AEAD encryption failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// None of the envelope header slots decrypted with our receive key
    #[error("could not decrypt - not a recipient?")]
    NotARecipient,

    /// An envelope header slot opened but the payload did not decrypt
    /// under the recovered symmetric secret
    #[error("envelope payload decryption failed")]
    PayloadDecryptionFailed,

    // ========================================================================
    // Resource Errors
    // ========================================================================

    /// A secret buffer was used (or freed) after it was already freed
    #[error("secret buffer used after destroy")]
    UseAfterDestroy,

    /// A background crypto task failed to complete
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailed(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidIndex(0).to_string(),
            "invalid derivation index: 0 (must be >= 1)"
        );
        assert_eq!(
            Error::UnknownBlobType("bogus".into()).to_string(),
            "unrecognized blob type: \"bogus\""
        );
    }

    #[test]
    fn test_decryption_failure_is_opaque() {
        // The message must not reveal whether the passphrase was wrong
        // or the ciphertext was corrupt.
        let msg = Error::DecryptionFailed.to_string();
        assert!(!msg.contains("passphrase"));
        assert!(!msg.contains("corrupt"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json")
            .map_err(Error::from)
            .unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}

//! # Cryptography Module
//!
//! This module provides all cryptographic primitives used by the seedchain
//! core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SEED DERIVATION                                 │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Root Secret (32 bytes)                                        │   │
//! │  │        │                                                        │   │
//! │  │        │  keyed BLAKE2b-256(salt=index, personal="HCDEVICE")   │   │
//! │  │        ▼                                                        │   │
//! │  │  Device Secret (32 bytes)                                      │   │
//! │  │        │                                                        │   │
//! │  │        │  Argon2id(pin, salt=device secret)                    │   │
//! │  │        ▼                                                        │   │
//! │  │  Device Pin Secret (32 bytes)                                  │   │
//! │  │        │                                                        │   │
//! │  │        │  keyed BLAKE2b-256(salt=index, personal="HCAPPLIC")   │   │
//! │  │        ▼                                                        │   │
//! │  │  Application Seed ──► Ed25519 + X25519 keypairs                │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ENVELOPE ENCRYPTION                             │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  1. Session Keys: X25519 DH + BLAKE2b-512                      │   │
//! │  │     keys = H(dh(a, B) ‖ client_pk ‖ server_pk)                 │   │
//! │  │     directional: client rx = server tx (first half)            │   │
//! │  │                                                                 │   │
//! │  │  2. Per-recipient header: AES-256-GCM(session tx key,          │   │
//! │  │     random symmetric secret S)                                 │   │
//! │  │                                                                 │   │
//! │  │  3. Payload: AES-256-GCM(S, data)                              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | Ed25519 | Signing | Fast, small keys, widely audited |
//! | X25519 | Key Exchange | Fast ECDH, same curve as Ed25519 |
//! | AES-256-GCM | Encryption | Hardware acceleration, AEAD |
//! | keyed BLAKE2b | Subkey Derivation | Indexed, context-separated subkeys |
//! | Argon2id | Password Hashing | Memory-hard, GPU/ASIC resistant |
//! | BIP39 | Seed Backup | User-friendly backup, standard |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: All secret keys are zeroized when dropped
//! 2. **Constant-Time Operations**: Using dalek for constant-time crypto
//! 3. **Secure Random**: Using `rand::rngs::OsRng` for cryptographic randomness
//! 4. **No Key Reuse**: Unique nonces for every encryption operation

mod encryption;
mod kdf;
mod keys;
mod pwhash;
mod signing;

pub use encryption::{decrypt, encrypt, EncryptionKey, Nonce, NONCE_SIZE};
pub use kdf::{derive_subkey, KdfContext, APPLICATION_CONTEXT, DEVICE_CONTEXT};
pub use keys::{EncryptionKeyPair, SessionKeys, SigningKeyPair};
pub use pwhash::{pw_dec, pw_enc, pw_hash, PwHashLimits};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};

/// Size of secret keys and derived subkeys in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

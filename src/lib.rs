//! # Seedchain Core
//!
//! A hierarchical key-derivation and credential-management core for
//! distributed identities: one root secret deterministically derives
//! per-device and per-application signing/encryption keypairs, with
//! 24-word mnemonic backup, passphrase-protected persistence, and
//! multi-recipient envelope encryption.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SEEDCHAIN CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │    Seed     │  │   Bundle    │  │  Identity   │  │     Blob     │   │
//! │  │             │  │             │  │             │  │              │   │
//! │  │ - Root      │  │ - Sign      │  │ - base64    │  │ - Tagged     │   │
//! │  │ - Device    │  │ - Verify    │  │   codec     │  │ - Passphrase │   │
//! │  │ - DevicePin │  │ - Envelope  │  │ - Round-    │  │   encrypted  │   │
//! │  │ - Mnemonic  │  │   encrypt   │  │   trip      │  │ - JSON       │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘   │
//! │         │                │                │                │           │
//! │         └────────────────┴────────────────┴────────────────┘           │
//! │                                   │                                     │
//! │  ┌─────────────┐  ┌─────────────┐ │                                     │
//! │  │   Crypto    │  │     Mem     │ │                                     │
//! │  │             │  │             │◄┘                                     │
//! │  │ - Ed25519   │  │ - mlock'd   │                                       │
//! │  │ - X25519    │  │   buffers   │                                       │
//! │  │ - AES-GCM   │  │ - zero on   │                                       │
//! │  │ - BLAKE2b   │  │   free      │                                       │
//! │  │ - Argon2id  │  │ - scoped    │                                       │
//! │  │ - BIP39     │  │   reads     │                                       │
//! │  └─────────────┘  └─────────────┘                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derivation Hierarchy
//!
//! ```text
//! RootSeed ──(index, "HCDEVICE")──► DeviceSeed ──(pin, Argon2id)──►
//! DevicePinSeed ──(index, "HCAPPLIC")──► KeyBundle
//! ```
//!
//! Every step is pure and deterministic, so a single backed-up root
//! recovers every identity ever derived from it.
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`mem`] - Page-locked secret buffers with scoped read access
//! - [`crypto`] - Cryptographic primitives (keys, derivation, AEAD, Argon2id)
//! - [`identity`] - The public identity codec
//! - [`blob`] - Tagged, passphrase-encrypted persistence records
//! - [`seed`] - The typed seed hierarchy
//! - [`bundle`] - Key bundles: signing, verification, envelope encryption
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Secret Containment (mem)                                     │
//! │  ──────────────────────────────────                                     │
//! │  Secrets live in page-locked buffers, are only readable inside         │
//! │  scoped windows, and are zeroed synchronously on destroy. Using a      │
//! │  freed buffer fails loudly.                                            │
//! │                                                                         │
//! │  Layer 2: Hardened Derivation (crypto)                                 │
//! │  ──────────────────────────────────────                                 │
//! │  Child secrets come from keyed BLAKE2b with index + context domain     │
//! │  separation; pin hardening uses memory-hard Argon2id.                  │
//! │                                                                         │
//! │  Layer 3: Authenticated Persistence (blob)                             │
//! │  ──────────────────────────────────────────                             │
//! │  At-rest secrets are AES-256-GCM encrypted under Argon2id-derived      │
//! │  keys; wrong passphrase and corruption are indistinguishable.          │
//! │                                                                         │
//! │  Layer 4: Envelope Encryption (bundle)                                 │
//! │  ──────────────────────────────────────                                 │
//! │  One payload, many recipients: per-recipient session keys wrap a       │
//! │  random symmetric secret; only listed recipients can open it.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod blob;
pub mod bundle;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod mem;
pub mod seed;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use blob::{BlobType, PersistenceBlob};
pub use bundle::KeyBundle;
pub use crypto::{PwHashLimits, Signature};
pub use error::{Error, Result};
pub use identity::Identity;
pub use mem::{LockLevel, SecretBuffer};
pub use seed::{DevicePinSeed, DeviceSeed, RootSeed, Seed, SeedInput, SeedType};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of the seedchain core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[tokio::test]
    async fn test_full_hierarchy_walkthrough() {
        // Root → device → pin → application bundle, then round-trip the
        // bundle through a blob and exchange an envelope.
        let root = RootSeed::new_random().unwrap();
        let device = root.get_device_seed(1).unwrap();
        let pin = device
            .get_device_pin_seed_with_limits("123456", PwHashLimits::Minimum)
            .await
            .unwrap();
        let alice = pin.get_application_key_bundle(1).unwrap();
        let bob = pin.get_application_key_bundle(2).unwrap();

        assert_ne!(alice.get_id(), bob.get_id());

        let cipher = alice
            .encrypt(&[bob.get_id().clone()], b"hello bob")
            .unwrap();
        assert_eq!(bob.decrypt(alice.get_id(), &cipher).unwrap(), b"hello bob");

        let blob = alice
            .get_bundle_with_limits("passphrase", "alice's app key", PwHashLimits::Minimum)
            .await
            .unwrap();
        let restored = KeyBundle::from_bundle(&blob, "passphrase").await.unwrap();
        assert_eq!(restored.get_id(), alice.get_id());
    }
}

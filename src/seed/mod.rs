//! # Seed Hierarchy
//!
//! Typed 32-byte secrets with deterministic derivation, mnemonic backup,
//! and passphrase-protected persistence.
//!
//! ## Derivation Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SEED HIERARCHY                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  RootSeed (pure entropy, the one secret a user must back up)           │
//! │      │                                                                 │
//! │      │  get_device_seed(index)                                         │
//! │      │  keyed BLAKE2b-256, context "HCDEVICE"                          │
//! │      ▼                                                                 │
//! │  DeviceSeed (one per device, awaiting pin derivation)                  │
//! │      │                                                                 │
//! │      │  get_device_pin_seed(pin)                                       │
//! │      │  Argon2id(pin, salt = device secret)                            │
//! │      ▼                                                                 │
//! │  DevicePinSeed (pin-hardened)                                          │
//! │      │                                                                 │
//! │      │  get_application_key_bundle(index)                              │
//! │      │  keyed BLAKE2b-256, context "HCAPPLIC"                          │
//! │      ▼                                                                 │
//! │  KeyBundle (per-application signing + encryption keys)                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every arrow is pure and deterministic: the same parent secret and the
//! same index (or pin) always reproduce the same child, which is what
//! makes an entire identity tree recoverable from a single 24-word
//! backup of the root.
//!
//! The three seed roles are distinct types, so "only a `DeviceSeed` can
//! produce a `DevicePinSeed`" is a compile-time rule rather than a
//! runtime tag check. The [`Seed`] enum exists for the one place the
//! role is only known at runtime: reconstructing from a persistence
//! blob's type tag.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::blob::{BlobType, PersistenceBlob};
use crate::bundle::KeyBundle;
use crate::crypto::{self, PwHashLimits, APPLICATION_CONTEXT, DEVICE_CONTEXT};
use crate::error::{Error, Result};
use crate::mem::SecretBuffer;

/// Seed secrets are always exactly 32 bytes
pub const SEED_SIZE: usize = 32;

/// Number of words in a seed mnemonic
pub const MNEMONIC_WORDS: usize = 24;

/// The role a seed plays in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedType {
    /// Pure entropy at the top of the hierarchy
    Root,
    /// Derived per device from a root seed
    Device,
    /// A device seed hardened with a user pin
    DevicePin,
}

impl SeedType {
    /// The persistence tag used when this seed role is blobbed
    pub fn blob_type(&self) -> BlobType {
        match self {
            Self::Root => BlobType::RootSeed,
            Self::Device => BlobType::DeviceSeed,
            Self::DevicePin => BlobType::DevicePinSeed,
        }
    }
}

/// Construction input for a seed: either an existing 32-byte secret or a
/// 24-word mnemonic backup.
pub enum SeedInput {
    /// Adopt a 32-byte secret buffer directly
    Secret(SecretBuffer),
    /// Decode a 24-word mnemonic's entropy
    Mnemonic(String),
}

impl From<SecretBuffer> for SeedInput {
    fn from(buf: SecretBuffer) -> Self {
        Self::Secret(buf)
    }
}

impl From<String> for SeedInput {
    fn from(phrase: String) -> Self {
        Self::Mnemonic(phrase)
    }
}

impl From<&str> for SeedInput {
    fn from(phrase: &str) -> Self {
        Self::Mnemonic(phrase.to_string())
    }
}

/// Shared state and behavior behind every seed role.
struct SeedCore {
    kind: SeedType,
    secret: SecretBuffer,
}

impl SeedCore {
    /// Validate and wrap construction input.
    fn new(kind: SeedType, input: SeedInput) -> Result<Self> {
        match input {
            SeedInput::Secret(secret) => Self::from_secret(kind, secret),
            SeedInput::Mnemonic(phrase) => {
                let words = phrase.split_whitespace().count();
                if words != MNEMONIC_WORDS {
                    return Err(Error::InvalidSeedInput(format!(
                        "expected a {}-byte secret or a {}-word mnemonic, got {} words",
                        SEED_SIZE, MNEMONIC_WORDS, words
                    )));
                }
                let mnemonic = Mnemonic::parse_normalized(&phrase).map_err(|e| {
                    Error::InvalidSeedInput(format!("invalid mnemonic: {}", e))
                })?;
                let mut entropy = Zeroizing::new(mnemonic.to_entropy());
                let secret = SecretBuffer::from_vec(std::mem::take(&mut *entropy));
                Self::from_secret(kind, secret)
            }
        }
    }

    fn from_secret(kind: SeedType, secret: SecretBuffer) -> Result<Self> {
        if secret.len() != SEED_SIZE {
            return Err(Error::InvalidSeedInput(format!(
                "secret must be {} bytes, got {}",
                SEED_SIZE,
                secret.len()
            )));
        }
        Ok(Self { kind, secret })
    }

    /// 24-word mnemonic encoding of the secret. Pure; never mutates state.
    fn mnemonic(&self) -> Result<String> {
        self.secret.read(|s| {
            Mnemonic::from_entropy(s)
                .map(|m| m.to_string())
                .map_err(|e| Error::KeyDerivationFailed(format!("mnemonic encoding: {}", e)))
        })?
    }

    /// Passphrase-encrypt the secret into a tagged persistence blob.
    async fn to_blob(
        &self,
        passphrase: &str,
        hint: &str,
        limits: PwHashLimits,
    ) -> Result<PersistenceBlob> {
        let secret = self.secret.read(|s| Zeroizing::new(s.to_vec()))?;
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let cipher =
            tokio::task::spawn_blocking(move || crypto::pw_enc(&secret, &passphrase, limits))
                .await??;

        tracing::debug!(blob_type = %self.kind.blob_type(), "seed exported to blob");
        Ok(PersistenceBlob::new(
            self.kind.blob_type(),
            hint,
            STANDARD.encode(cipher),
        ))
    }

    /// Synchronously zero and release the secret.
    fn destroy(mut self) {
        let _ = self.secret.free();
    }
}

// ============================================================================
// ROOT SEED
// ============================================================================

/// The top of the hierarchy: pure entropy.
pub struct RootSeed {
    core: SeedCore,
}

impl RootSeed {
    /// Generate a completely random root seed in page-locked memory.
    pub fn new_random() -> Result<Self> {
        let mut secret = SecretBuffer::secure(SEED_SIZE);
        secret.randomize()?;
        Ok(Self {
            core: SeedCore::from_secret(SeedType::Root, secret)?,
        })
    }

    /// Construct from a 32-byte secret or a 24-word mnemonic.
    pub fn new(input: impl Into<SeedInput>) -> Result<Self> {
        Ok(Self {
            core: SeedCore::new(SeedType::Root, input.into())?,
        })
    }

    /// Derive the device seed for `index` (indexes start at 1).
    ///
    /// Deterministic: the same root and index always produce the same
    /// device seed.
    pub fn get_device_seed(&self, index: u32) -> Result<DeviceSeed> {
        if index < 1 {
            return Err(Error::InvalidIndex(index));
        }
        let secret = crypto::derive_subkey(&self.core.secret, index, &DEVICE_CONTEXT)?;
        tracing::debug!(index, "derived device seed");
        Ok(DeviceSeed {
            core: SeedCore::from_secret(SeedType::Device, secret)?,
        })
    }

    /// 24-word mnemonic backup of this seed.
    pub fn get_mnemonic(&self) -> Result<String> {
        self.core.mnemonic()
    }

    /// Export as a passphrase-encrypted blob (default cost).
    pub async fn get_blob(&self, passphrase: &str, hint: &str) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, PwHashLimits::default()).await
    }

    /// Export as a passphrase-encrypted blob with explicit cost limits.
    pub async fn get_blob_with_limits(
        &self,
        passphrase: &str,
        hint: &str,
        limits: PwHashLimits,
    ) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, limits).await
    }

    /// This seed's role in the hierarchy.
    pub fn seed_type(&self) -> SeedType {
        SeedType::Root
    }

    /// Synchronously zero the secret and consume the seed.
    pub fn destroy(self) {
        self.core.destroy();
    }
}

// ============================================================================
// DEVICE SEED
// ============================================================================

/// A per-device seed, waiting for pin derivation.
pub struct DeviceSeed {
    core: SeedCore,
}

impl DeviceSeed {
    /// Construct from a 32-byte secret or a 24-word mnemonic.
    pub fn new(input: impl Into<SeedInput>) -> Result<Self> {
        Ok(Self {
            core: SeedCore::new(SeedType::Device, input.into())?,
        })
    }

    /// Harden this device seed with a user pin (>= 4 characters).
    ///
    /// Runs the memory-hard Argon2id hash with this seed's secret as the
    /// salt, on the blocking pool. The task cannot be cancelled
    /// mid-flight, so an awaiting caller never observes partial state.
    pub async fn get_device_pin_seed(&self, pin: &str) -> Result<DevicePinSeed> {
        self.get_device_pin_seed_with_limits(pin, PwHashLimits::default())
            .await
    }

    /// [`get_device_pin_seed`](Self::get_device_pin_seed) with explicit
    /// cost limits.
    pub async fn get_device_pin_seed_with_limits(
        &self,
        pin: &str,
        limits: PwHashLimits,
    ) -> Result<DevicePinSeed> {
        if pin.chars().count() < 4 {
            return Err(Error::InvalidPin);
        }

        let pin = Zeroizing::new(pin.as_bytes().to_vec());
        let salt = self.core.secret.read(|s| Zeroizing::new(s.to_vec()))?;
        let hash =
            tokio::task::spawn_blocking(move || crypto::pw_hash(&pin, &salt, limits)).await??;

        tracing::debug!("derived device pin seed");
        Ok(DevicePinSeed {
            core: SeedCore::from_secret(SeedType::DevicePin, SecretBuffer::from_slice(&*hash))?,
        })
    }

    /// 24-word mnemonic backup of this seed.
    pub fn get_mnemonic(&self) -> Result<String> {
        self.core.mnemonic()
    }

    /// Export as a passphrase-encrypted blob (default cost).
    pub async fn get_blob(&self, passphrase: &str, hint: &str) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, PwHashLimits::default()).await
    }

    /// Export as a passphrase-encrypted blob with explicit cost limits.
    pub async fn get_blob_with_limits(
        &self,
        passphrase: &str,
        hint: &str,
        limits: PwHashLimits,
    ) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, limits).await
    }

    /// This seed's role in the hierarchy.
    pub fn seed_type(&self) -> SeedType {
        SeedType::Device
    }

    /// Synchronously zero the secret and consume the seed.
    pub fn destroy(self) {
        self.core.destroy();
    }
}

// ============================================================================
// DEVICE PIN SEED
// ============================================================================

/// A pin-hardened device seed; the parent of application key bundles.
pub struct DevicePinSeed {
    core: SeedCore,
}

impl DevicePinSeed {
    /// Construct from a 32-byte secret or a 24-word mnemonic.
    pub fn new(input: impl Into<SeedInput>) -> Result<Self> {
        Ok(Self {
            core: SeedCore::new(SeedType::DevicePin, input.into())?,
        })
    }

    /// Derive the application key bundle for `index` (indexes start at 1).
    pub fn get_application_key_bundle(&self, index: u32) -> Result<KeyBundle> {
        if index < 1 {
            return Err(Error::InvalidIndex(index));
        }
        let app_seed = crypto::derive_subkey(&self.core.secret, index, &APPLICATION_CONTEXT)?;
        let bundle = KeyBundle::new_from_seed(&app_seed)?;
        tracing::debug!(index, id = %bundle.get_id(), "derived application key bundle");
        Ok(bundle)
    }

    /// 24-word mnemonic backup of this seed.
    pub fn get_mnemonic(&self) -> Result<String> {
        self.core.mnemonic()
    }

    /// Export as a passphrase-encrypted blob (default cost).
    pub async fn get_blob(&self, passphrase: &str, hint: &str) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, PwHashLimits::default()).await
    }

    /// Export as a passphrase-encrypted blob with explicit cost limits.
    pub async fn get_blob_with_limits(
        &self,
        passphrase: &str,
        hint: &str,
        limits: PwHashLimits,
    ) -> Result<PersistenceBlob> {
        self.core.to_blob(passphrase, hint, limits).await
    }

    /// This seed's role in the hierarchy.
    pub fn seed_type(&self) -> SeedType {
        SeedType::DevicePin
    }

    /// Synchronously zero the secret and consume the seed.
    pub fn destroy(self) {
        self.core.destroy();
    }
}

// ============================================================================
// TAG-DISPATCHED RECONSTRUCTION
// ============================================================================

/// A seed whose role was only known at runtime, from a blob's type tag.
pub enum Seed {
    /// Reconstructed root seed
    Root(RootSeed),
    /// Reconstructed device seed
    Device(DeviceSeed),
    /// Reconstructed device pin seed
    DevicePin(DevicePinSeed),
}

impl Seed {
    /// Reconstruct a seed from a persistence blob.
    ///
    /// The type tag is resolved first; unrecognized tags (including
    /// `hcKeypair`, which is not a seed) fail with
    /// [`Error::UnknownBlobType`] before any decryption is attempted.
    /// A wrong passphrase or corrupt ciphertext fails with the opaque
    /// [`Error::DecryptionFailed`].
    pub async fn from_blob(blob: &PersistenceBlob, passphrase: &str) -> Result<Seed> {
        let kind = match blob.type_tag()? {
            BlobType::RootSeed => SeedType::Root,
            BlobType::DeviceSeed => SeedType::Device,
            BlobType::DevicePinSeed => SeedType::DevicePin,
            BlobType::Keypair => {
                return Err(Error::UnknownBlobType(blob.blob_type.clone()));
            }
        };

        let data = STANDARD
            .decode(&blob.data)
            .map_err(|_| Error::DecryptionFailed)?;
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let mut plaintext =
            tokio::task::spawn_blocking(move || crypto::pw_dec(&data, &passphrase)).await??;

        let secret = SecretBuffer::from_vec(std::mem::take(&mut *plaintext));
        let core = SeedCore::from_secret(kind, secret)?;

        tracing::debug!(blob_type = %blob.blob_type, "seed restored from blob");
        Ok(match kind {
            SeedType::Root => Seed::Root(RootSeed { core }),
            SeedType::Device => Seed::Device(DeviceSeed { core }),
            SeedType::DevicePin => Seed::DevicePin(DevicePinSeed { core }),
        })
    }

    fn core(&self) -> &SeedCore {
        match self {
            Seed::Root(s) => &s.core,
            Seed::Device(s) => &s.core,
            Seed::DevicePin(s) => &s.core,
        }
    }

    /// This seed's role in the hierarchy.
    pub fn seed_type(&self) -> SeedType {
        self.core().kind
    }

    /// 24-word mnemonic backup of this seed.
    pub fn get_mnemonic(&self) -> Result<String> {
        self.core().mnemonic()
    }

    /// Export as a passphrase-encrypted blob (default cost).
    pub async fn get_blob(&self, passphrase: &str, hint: &str) -> Result<PersistenceBlob> {
        self.core()
            .to_blob(passphrase, hint, PwHashLimits::default())
            .await
    }

    /// Unwrap as a root seed.
    pub fn into_root(self) -> Option<RootSeed> {
        match self {
            Seed::Root(s) => Some(s),
            _ => None,
        }
    }

    /// Unwrap as a device seed.
    pub fn into_device(self) -> Option<DeviceSeed> {
        match self {
            Seed::Device(s) => Some(s),
            _ => None,
        }
    }

    /// Unwrap as a device pin seed.
    pub fn into_device_pin(self) -> Option<DevicePinSeed> {
        match self {
            Seed::DevicePin(s) => Some(s),
            _ => None,
        }
    }

    /// Synchronously zero the secret and consume the seed.
    pub fn destroy(self) {
        match self {
            Seed::Root(s) => s.destroy(),
            Seed::Device(s) => s.destroy(),
            Seed::DevicePin(s) => s.destroy(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PwHashLimits = PwHashLimits::Minimum;

    /// The device-seed mnemonic for an all-zero root secret at index 384.
    const DEVICE_384_MNEMONIC: &str = "lecture butter globe amused sure visa festival soon \
         power robot leaf razor chief napkin pole pupil oak pupil gauge nest dentist demise \
         arm sweet";

    fn zero_root() -> RootSeed {
        RootSeed::new(SecretBuffer::secure(SEED_SIZE)).unwrap()
    }

    #[test]
    fn test_new_random_has_24_word_mnemonic() {
        let rs = RootSeed::new_random().unwrap();
        let mnemonic = rs.get_mnemonic().unwrap();
        assert_eq!(mnemonic.split_whitespace().count(), 24);
        rs.destroy();
    }

    #[test]
    fn test_mnemonic_round_trip() {
        let rs1 = RootSeed::new_random().unwrap();
        let mn1 = rs1.get_mnemonic().unwrap();

        let rs2 = RootSeed::new(mn1.as_str()).unwrap();
        let mn2 = rs2.get_mnemonic().unwrap();

        assert_eq!(mn1, mn2);
        rs1.destroy();
        rs2.destroy();
    }

    #[test]
    fn test_rejects_wrong_length_secret() {
        let result = RootSeed::new(SecretBuffer::secure(16));
        assert!(matches!(result, Err(Error::InvalidSeedInput(_))));
    }

    #[test]
    fn test_rejects_wrong_word_count() {
        let result = RootSeed::new("only three words");
        assert!(matches!(result, Err(Error::InvalidSeedInput(_))));
    }

    #[test]
    fn test_rejects_invalid_mnemonic_checksum() {
        let phrase = vec!["abandon"; 24].join(" ");
        let result = RootSeed::new(phrase);
        assert!(matches!(result, Err(Error::InvalidSeedInput(_))));
    }

    #[test]
    fn test_device_seed_vector() {
        // Fixed all-zero root secret, index 384: the derived device seed's
        // mnemonic is a stable reference value.
        let rs = zero_root();
        let ds = rs.get_device_seed(384).unwrap();
        assert_eq!(ds.get_mnemonic().unwrap(), DEVICE_384_MNEMONIC);
        ds.destroy();
        rs.destroy();
    }

    #[test]
    fn test_device_seed_index_validation() {
        let rs = zero_root();
        assert!(matches!(
            rs.get_device_seed(0),
            Err(Error::InvalidIndex(0))
        ));
        rs.destroy();
    }

    #[test]
    fn test_device_seeds_differ_by_index() {
        let rs = zero_root();
        let a = rs.get_device_seed(1).unwrap();
        let b = rs.get_device_seed(2).unwrap();
        assert_ne!(a.get_mnemonic().unwrap(), b.get_mnemonic().unwrap());
    }

    #[tokio::test]
    async fn test_pin_validation() {
        let rs = zero_root();
        let ds = rs.get_device_seed(1).unwrap();
        assert!(matches!(
            ds.get_device_pin_seed("a").await,
            Err(Error::InvalidPin)
        ));
        assert!(matches!(
            ds.get_device_pin_seed("123").await,
            Err(Error::InvalidPin)
        ));
    }

    #[tokio::test]
    async fn test_pin_chain_is_deterministic() {
        let rs = zero_root();
        let ds = rs.get_device_seed(384).unwrap();

        let dps1 = ds
            .get_device_pin_seed_with_limits("123456", LIMITS)
            .await
            .unwrap();
        let dps2 = ds
            .get_device_pin_seed_with_limits("123456", LIMITS)
            .await
            .unwrap();

        assert_eq!(dps1.get_mnemonic().unwrap(), dps2.get_mnemonic().unwrap());

        let kb1 = dps1.get_application_key_bundle(1952).unwrap();
        let kb2 = dps2.get_application_key_bundle(1952).unwrap();
        assert_eq!(kb1.get_id(), kb2.get_id());
    }

    #[tokio::test]
    async fn test_different_pins_diverge() {
        let rs = zero_root();
        let ds = rs.get_device_seed(1).unwrap();

        let a = ds
            .get_device_pin_seed_with_limits("123456", LIMITS)
            .await
            .unwrap();
        let b = ds
            .get_device_pin_seed_with_limits("654321", LIMITS)
            .await
            .unwrap();

        assert_ne!(a.get_mnemonic().unwrap(), b.get_mnemonic().unwrap());
    }

    #[tokio::test]
    async fn test_application_bundle_index_validation() {
        let rs = zero_root();
        let ds = rs.get_device_seed(1).unwrap();
        let dps = ds
            .get_device_pin_seed_with_limits("123456", LIMITS)
            .await
            .unwrap();

        assert!(matches!(
            dps.get_application_key_bundle(0),
            Err(Error::InvalidIndex(0))
        ));
    }

    #[tokio::test]
    async fn test_blob_round_trip_root() {
        let rs = RootSeed::new_random().unwrap();
        let mnemonic = rs.get_mnemonic().unwrap();

        let blob = rs
            .get_blob_with_limits("hello", "hola", LIMITS)
            .await
            .unwrap();
        assert_eq!(blob.hint, "hola");
        assert_eq!(blob.blob_type, "hcRootSeed");

        let restored = Seed::from_blob(&blob, "hello").await.unwrap();
        assert_eq!(restored.seed_type(), SeedType::Root);
        assert_eq!(restored.get_mnemonic().unwrap(), mnemonic);
        assert!(restored.into_root().is_some());
    }

    #[tokio::test]
    async fn test_blob_round_trip_device() {
        let rs = zero_root();
        let ds = rs.get_device_seed(384).unwrap();
        let mnemonic = ds.get_mnemonic().unwrap();

        let blob = ds
            .get_blob_with_limits("hello", "hola", LIMITS)
            .await
            .unwrap();
        assert_eq!(blob.blob_type, "hcDeviceSeed");

        let restored = Seed::from_blob(&blob, "hello").await.unwrap();
        assert_eq!(restored.seed_type(), SeedType::Device);
        assert_eq!(restored.get_mnemonic().unwrap(), mnemonic);
        assert!(restored.into_device().is_some());
    }

    #[tokio::test]
    async fn test_blob_round_trip_device_pin() {
        let rs = zero_root();
        let ds = rs.get_device_seed(384).unwrap();
        let dps = ds
            .get_device_pin_seed_with_limits("123456", LIMITS)
            .await
            .unwrap();
        let mnemonic = dps.get_mnemonic().unwrap();

        let blob = dps
            .get_blob_with_limits("hello", "hola", LIMITS)
            .await
            .unwrap();
        assert_eq!(blob.blob_type, "hcDevicePinSeed");

        let restored = Seed::from_blob(&blob, "hello").await.unwrap();
        assert_eq!(restored.seed_type(), SeedType::DevicePin);
        assert_eq!(restored.get_mnemonic().unwrap(), mnemonic);
    }

    #[tokio::test]
    async fn test_blob_wrong_passphrase_fails() {
        let rs = RootSeed::new_random().unwrap();
        let blob = rs
            .get_blob_with_limits("hello", "hola", LIMITS)
            .await
            .unwrap();

        assert!(matches!(
            Seed::from_blob(&blob, "wrong").await,
            Err(Error::DecryptionFailed)
        ));
    }

    #[tokio::test]
    async fn test_blob_unknown_type_fails_before_decryption() {
        let blob = PersistenceBlob {
            blob_type: "badBlobType".into(),
            hint: "".into(),
            data: "".into(),
        };
        assert!(matches!(
            Seed::from_blob(&blob, "hello").await,
            Err(Error::UnknownBlobType(t)) if t == "badBlobType"
        ));
    }

    #[tokio::test]
    async fn test_keypair_blob_is_not_a_seed() {
        let blob = PersistenceBlob {
            blob_type: "hcKeypair".into(),
            hint: "".into(),
            data: "".into(),
        };
        assert!(matches!(
            Seed::from_blob(&blob, "hello").await,
            Err(Error::UnknownBlobType(_))
        ));
    }
}

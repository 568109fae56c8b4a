//! # Key Management
//!
//! Signing and encryption keypairs, both derivable from the same 32-byte
//! seed, plus directional session keys for envelope encryption.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SigningKeyPair (Ed25519)                                              │
//! │  ─────────────────────────                                              │
//! │  seed (32 bytes) ──► Ed25519 secret ──► 32-byte public key             │
//! │  Signs and proves control of an identity.                              │
//! │                                                                         │
//! │  EncryptionKeyPair (X25519)                                            │
//! │  ──────────────────────────                                             │
//! │  seed (32 bytes) ──► BLAKE2b-256 ──► X25519 secret ──► public key      │
//! │  Key exchange for envelope session keys.                               │
//! │                                                                         │
//! │  SessionKeys (directional)                                             │
//! │  ─────────────────────────                                              │
//! │  keys = BLAKE2b-512(dh ‖ client_pk ‖ server_pk)                        │
//! │  client: rx = keys[..32],  tx = keys[32..]                             │
//! │  server: tx = keys[..32],  rx = keys[32..]                             │
//! │  so each side's tx key is the other side's rx key.                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use blake2::digest::consts::{U32, U64};
use blake2::{Blake2b, Digest};
use ed25519_dalek::{SigningKey, VerifyingKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

type Blake2b256 = Blake2b<U32>;
type Blake2b512 = Blake2b<U64>;

/// Ed25519 signing keypair
pub struct SigningKeyPair {
    // ed25519_dalek::SigningKey zeroizes its own secret on drop
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Derive deterministically from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(seed),
        }
    }

    /// Get the secret key bytes (for persistence only; never log)
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKeyPair(pub {})", hex::encode(self.public_bytes()))
    }
}

/// X25519 encryption keypair for key exchange
pub struct EncryptionKeyPair {
    // x25519_dalek::StaticSecret zeroizes its own secret on drop
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl EncryptionKeyPair {
    /// Derive deterministically from a 32-byte seed.
    ///
    /// The secret scalar is BLAKE2b-256 of the seed, so the same seed can
    /// feed both the signing and the encryption keypair without the two
    /// sharing key material.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let digest = Blake2b256::digest(seed);
        let mut sk = Zeroizing::new([0u8; 32]);
        sk.copy_from_slice(digest.as_slice());
        Self::from_bytes(&sk)
    }

    /// Create from raw secret key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the secret key bytes (for persistence only; never log)
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Derive session keys, this side acting as the session "server"
    /// (the envelope encryptor).
    pub fn server_session(&self, client_pk: &[u8; 32]) -> Result<SessionKeys> {
        let halves = self.session_halves(client_pk, client_pk, &self.public_bytes())?;
        Ok(SessionKeys {
            tx: halves.0,
            rx: halves.1,
        })
    }

    /// Derive session keys, this side acting as the session "client"
    /// (the envelope recipient).
    pub fn client_session(&self, server_pk: &[u8; 32]) -> Result<SessionKeys> {
        let halves = self.session_halves(server_pk, &self.public_bytes(), server_pk)?;
        Ok(SessionKeys {
            rx: halves.0,
            tx: halves.1,
        })
    }

    /// Shared session computation: hash the DH output with both public
    /// keys in client-then-server order and split the 64-byte digest.
    fn session_halves(
        &self,
        peer_pk: &[u8; 32],
        client_pk: &[u8; 32],
        server_pk: &[u8; 32],
    ) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
        let shared = self.secret.diffie_hellman(&X25519PublicKey::from(*peer_pk));
        if !shared.was_contributory() {
            return Err(Error::KeyExchangeFailed(
                "degenerate shared secret (low-order peer key)".into(),
            ));
        }

        let mut hasher = Blake2b512::new();
        hasher.update(shared.as_bytes());
        hasher.update(client_pk);
        hasher.update(server_pk);
        let digest = hasher.finalize();

        let mut first = Zeroizing::new([0u8; 32]);
        let mut second = Zeroizing::new([0u8; 32]);
        first.copy_from_slice(&digest.as_slice()[..32]);
        second.copy_from_slice(&digest.as_slice()[32..]);
        Ok((first, second))
    }
}

impl std::fmt::Debug for EncryptionKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EncryptionKeyPair(pub {})",
            hex::encode(self.public_bytes())
        )
    }
}

/// Directional symmetric keys for one session.
///
/// `tx` encrypts traffic toward the peer; `rx` decrypts traffic from the
/// peer. Both are zeroized on drop.
pub struct SessionKeys {
    rx: Zeroizing<[u8; 32]>,
    tx: Zeroizing<[u8; 32]>,
}

impl SessionKeys {
    /// Key for decrypting traffic from the peer
    pub fn rx(&self) -> &[u8; 32] {
        &self.rx
    }

    /// Key for encrypting traffic toward the peer
    pub fn tx(&self) -> &[u8; 32] {
        &self.tx
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_keypair_deterministic() {
        let seed = [42u8; 32];
        let a = SigningKeyPair::from_seed(&seed);
        let b = SigningKeyPair::from_seed(&seed);
        assert_eq!(a.public_bytes(), b.public_bytes());
    }

    #[test]
    fn test_encryption_keypair_deterministic() {
        let seed = [42u8; 32];
        let a = EncryptionKeyPair::from_seed(&seed);
        let b = EncryptionKeyPair::from_seed(&seed);
        assert_eq!(a.public_bytes(), b.public_bytes());
    }

    #[test]
    fn test_sign_and_encrypt_keys_independent() {
        // Same seed, but the keypairs must not share secret material.
        let seed = [42u8; 32];
        let sign = SigningKeyPair::from_seed(&seed);
        let enc = EncryptionKeyPair::from_seed(&seed);
        assert_ne!(*sign.secret_bytes(), *enc.secret_bytes());
    }

    #[test]
    fn test_session_keys_complement() {
        let server = EncryptionKeyPair::from_seed(&[1u8; 32]);
        let client = EncryptionKeyPair::from_seed(&[2u8; 32]);

        let s = server.server_session(&client.public_bytes()).unwrap();
        let c = client.client_session(&server.public_bytes()).unwrap();

        assert_eq!(s.tx(), c.rx());
        assert_eq!(s.rx(), c.tx());
    }

    #[test]
    fn test_session_keys_directional() {
        let server = EncryptionKeyPair::from_seed(&[1u8; 32]);
        let client = EncryptionKeyPair::from_seed(&[2u8; 32]);

        let s = server.server_session(&client.public_bytes()).unwrap();
        assert_ne!(s.tx(), s.rx());
    }

    #[test]
    fn test_distinct_peers_distinct_sessions() {
        let server = EncryptionKeyPair::from_seed(&[1u8; 32]);
        let client_a = EncryptionKeyPair::from_seed(&[2u8; 32]);
        let client_b = EncryptionKeyPair::from_seed(&[3u8; 32]);

        let a = server.server_session(&client_a.public_bytes()).unwrap();
        let b = server.server_session(&client_b.public_bytes()).unwrap();
        assert_ne!(a.tx(), b.tx());
    }

    #[test]
    fn test_debug_shows_only_public_key() {
        let kp = EncryptionKeyPair::from_seed(&[9u8; 32]);
        let debug = format!("{:?}", kp);
        assert!(debug.contains(&hex::encode(kp.public_bytes())));
        assert!(!debug.contains(&hex::encode(&*kp.secret_bytes())));
    }
}

//! # Password Hashing & Passphrase Encryption
//!
//! Argon2id for memory-hard password hashing, plus a passphrase
//! encryption envelope built on it.
//!
//! ## Passphrase Cipher Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   PASSPHRASE CIPHER (self-describing)                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  bincode {                                                             │
//! │    salt:          16 random bytes (Argon2id salt)                      │
//! │    ops_limit:     u32 (Argon2id passes)                                │
//! │    mem_limit_kib: u32 (Argon2id memory, KiB)                           │
//! │    nonce:         12 bytes (AES-256-GCM)                               │
//! │    cipher:        ciphertext + tag                                     │
//! │  }                                                                     │
//! │                                                                         │
//! │  passphrase ──Argon2id(salt, ops, mem)──► 32-byte key                  │
//! │  key ──AES-256-GCM(nonce)──► cipher                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cost parameters ride along with the ciphertext, so decryption
//! never needs out-of-band configuration and old blobs stay readable
//! after the defaults are raised.
//!
//! ## Cost Presets
//!
//! | Preset | Passes | Memory | Intended use |
//! |--------|--------|--------|--------------|
//! | Minimum | 1 | 8 MiB | tests, throwaway material |
//! | Interactive | 2 | 64 MiB | frequent interactive unlocks |
//! | Moderate | 3 | 256 MiB | default |
//! | Sensitive | 4 | 1 GiB | long-term at-rest secrets |

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::encryption::{self, EncryptionKey, Nonce, NONCE_SIZE};
use crate::error::{Error, Result};

/// Argon2id salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Argon2id output length in bytes (AES-256 key)
const HASH_SIZE: usize = 32;

/// Hard ceilings applied when reading parameters back out of a cipher,
/// so corrupt or hostile blobs cannot demand absurd allocations.
const MAX_OPS_LIMIT: u32 = 16;
const MAX_MEM_LIMIT_KIB: u32 = 1_048_576;

/// Tunable Argon2id cost presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwHashLimits {
    /// 1 pass, 8 MiB. Only suitable for tests and throwaway material.
    Minimum,
    /// 2 passes, 64 MiB
    Interactive,
    /// 3 passes, 256 MiB
    Moderate,
    /// 4 passes, 1 GiB
    Sensitive,
}

impl PwHashLimits {
    /// Number of Argon2id passes
    pub fn ops_limit(&self) -> u32 {
        match self {
            Self::Minimum => 1,
            Self::Interactive => 2,
            Self::Moderate => 3,
            Self::Sensitive => 4,
        }
    }

    /// Argon2id memory cost in KiB
    pub fn mem_limit_kib(&self) -> u32 {
        match self {
            Self::Minimum => 8 * 1024,
            Self::Interactive => 64 * 1024,
            Self::Moderate => 256 * 1024,
            Self::Sensitive => 1024 * 1024,
        }
    }
}

impl Default for PwHashLimits {
    fn default() -> Self {
        Self::Moderate
    }
}

/// Hash a password into 32 bytes with Argon2id.
///
/// Deterministic in `(password, salt, cost)`; the salt must be at least
/// 8 bytes. This is the memory-hard step, so callers are expected to run
/// it on a blocking thread.
pub fn pw_hash(
    password: &[u8],
    salt: &[u8],
    limits: PwHashLimits,
) -> Result<Zeroizing<[u8; 32]>> {
    pw_hash_raw(password, salt, limits.ops_limit(), limits.mem_limit_kib())
}

fn pw_hash_raw(
    password: &[u8],
    salt: &[u8],
    ops_limit: u32,
    mem_limit_kib: u32,
) -> Result<Zeroizing<[u8; 32]>> {
    let params = Params::new(mem_limit_kib, ops_limit, 1, Some(HASH_SIZE))
        .map_err(|e| Error::KeyDerivationFailed(format!("bad argon2 parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut hash = Zeroizing::new([0u8; HASH_SIZE]);
    argon2
        .hash_password_into(password, salt, hash.as_mut())
        .map_err(|e| Error::KeyDerivationFailed(format!("argon2 failed: {}", e)))?;

    Ok(hash)
}

/// Self-describing passphrase ciphertext
#[derive(Serialize, Deserialize)]
struct PwCipher {
    salt: [u8; SALT_SIZE],
    ops_limit: u32,
    mem_limit_kib: u32,
    nonce: [u8; NONCE_SIZE],
    cipher: Vec<u8>,
}

/// Encrypt `plaintext` under a passphrase.
///
/// Generates a fresh random salt, derives an AES-256 key with Argon2id at
/// the given cost, and returns the bincode-encoded self-describing cipher.
pub fn pw_enc(plaintext: &[u8], passphrase: &[u8], limits: PwHashLimits) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let key = pw_hash(passphrase, &salt, limits)?;
    let (nonce, cipher) = encryption::encrypt(&EncryptionKey::from_bytes(*key), plaintext)?;

    let out = PwCipher {
        salt,
        ops_limit: limits.ops_limit(),
        mem_limit_kib: limits.mem_limit_kib(),
        nonce: *nonce.as_bytes(),
        cipher,
    };
    Ok(bincode::serialize(&out)?)
}

/// Decrypt a passphrase ciphertext produced by [`pw_enc`].
///
/// Every failure mode (unparseable data, hostile parameters, wrong
/// passphrase, tampered ciphertext) collapses into the single opaque
/// [`Error::DecryptionFailed`] so callers cannot be used as an oracle.
pub fn pw_dec(data: &[u8], passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let parsed: PwCipher = bincode::deserialize(data).map_err(|_| Error::DecryptionFailed)?;

    if parsed.ops_limit == 0
        || parsed.ops_limit > MAX_OPS_LIMIT
        || parsed.mem_limit_kib > MAX_MEM_LIMIT_KIB
    {
        return Err(Error::DecryptionFailed);
    }

    let key = pw_hash_raw(passphrase, &parsed.salt, parsed.ops_limit, parsed.mem_limit_kib)
        .map_err(|_| Error::DecryptionFailed)?;

    let plaintext = encryption::decrypt(
        &EncryptionKey::from_bytes(*key),
        &Nonce::from_bytes(parsed.nonce),
        &parsed.cipher,
    )
    .map_err(|_| Error::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PwHashLimits = PwHashLimits::Minimum;

    #[test]
    fn test_pw_hash_deterministic() {
        let a = pw_hash(b"password", &[1u8; 16], LIMITS).unwrap();
        let b = pw_hash(b"password", &[1u8; 16], LIMITS).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_pw_hash_salt_matters() {
        let a = pw_hash(b"password", &[1u8; 16], LIMITS).unwrap();
        let b = pw_hash(b"password", &[2u8; 16], LIMITS).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_pw_hash_accepts_32_byte_salt() {
        // Device pin derivation uses a 32-byte parent secret as salt.
        let hash = pw_hash(b"123456", &[7u8; 32], LIMITS).unwrap();
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn test_pw_enc_dec_round_trip() {
        let cipher = pw_enc(b"secret payload", b"hunter2", LIMITS).unwrap();
        let plain = pw_dec(&cipher, b"hunter2").unwrap();
        assert_eq!(&*plain, b"secret payload");
    }

    #[test]
    fn test_wrong_passphrase_fails() {
        let cipher = pw_enc(b"secret payload", b"hunter2", LIMITS).unwrap();
        assert!(matches!(
            pw_dec(&cipher, b"hunter3"),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_cipher_fails() {
        let mut cipher = pw_enc(b"secret payload", b"hunter2", LIMITS).unwrap();
        let last = cipher.len() - 1;
        cipher[last] ^= 0xFF;
        assert!(matches!(
            pw_dec(&cipher, b"hunter2"),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_garbage_input_fails_like_wrong_passphrase() {
        let err = pw_dec(b"not a cipher at all", b"hunter2").unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
    }

    #[test]
    fn test_cost_parameters_recorded_in_cipher() {
        // Decryption succeeds without being told which preset was used.
        let cipher = pw_enc(b"payload", b"pw", PwHashLimits::Minimum).unwrap();
        assert!(pw_dec(&cipher, b"pw").is_ok());
    }

    #[test]
    fn test_hostile_parameters_rejected() {
        let hostile = PwCipher {
            salt: [0u8; SALT_SIZE],
            ops_limit: u32::MAX,
            mem_limit_kib: u32::MAX,
            nonce: [0u8; NONCE_SIZE],
            cipher: vec![0u8; 48],
        };
        let data = bincode::serialize(&hostile).unwrap();
        assert!(matches!(
            pw_dec(&data, b"pw"),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_preset_ordering() {
        assert!(PwHashLimits::Interactive.mem_limit_kib() < PwHashLimits::Moderate.mem_limit_kib());
        assert!(PwHashLimits::Moderate.mem_limit_kib() < PwHashLimits::Sensitive.mem_limit_kib());
        assert_eq!(PwHashLimits::default(), PwHashLimits::Moderate);
    }
}

//! # Subkey Derivation
//!
//! Deterministic derivation of indexed subkeys from a parent secret.
//!
//! ## Construction
//!
//! ```text
//! subkey = BLAKE2b-256(
//!     key      = parent secret (32 bytes),
//!     salt     = LE64(index) ‖ 0⁸,
//!     personal = context (8 bytes) ‖ 0⁸,
//!     message  = empty
//! )
//! ```
//!
//! The 8-byte context label gives cryptographic domain separation between
//! derivation purposes: two hierarchies derived from the same parent with
//! different contexts are independent, and the same `(parent, index,
//! context)` triple always reproduces the same subkey. This is the basis
//! for recovering an entire identity tree from a single backed-up root.

use blake2::digest::consts::U32;
use blake2::digest::Mac;
use blake2::Blake2bMac;

use crate::error::{Error, Result};
use crate::mem::SecretBuffer;

/// Length of a derivation context label in bytes
pub const CONTEXT_SIZE: usize = 8;

/// An 8-byte derivation context label
pub type KdfContext = [u8; CONTEXT_SIZE];

/// Context for deriving device secrets from a root secret
pub const DEVICE_CONTEXT: KdfContext = *b"HCDEVICE";

/// Context for deriving application seeds from a device pin secret
pub const APPLICATION_CONTEXT: KdfContext = *b"HCAPPLIC";

/// BLAKE2b salt/personal block size
const PARAM_BLOCK_SIZE: usize = 16;

/// Derive a 32-byte subkey from `parent` for the given index and context.
///
/// Purely deterministic; the index is the caller-facing "which child"
/// selector and the context separates derivation purposes. Index range
/// checks (indexes start at 1) belong to the seed layer, not here.
pub fn derive_subkey(
    parent: &SecretBuffer,
    index: u32,
    context: &KdfContext,
) -> Result<SecretBuffer> {
    let mut salt = [0u8; PARAM_BLOCK_SIZE];
    salt[..8].copy_from_slice(&u64::from(index).to_le_bytes());

    let mut personal = [0u8; PARAM_BLOCK_SIZE];
    personal[..CONTEXT_SIZE].copy_from_slice(context);

    let derived = parent.read(|key| -> Result<SecretBuffer> {
        let mac = Blake2bMac::<U32>::new_with_salt_and_personal(key, &salt, &personal)
            .map_err(|_| {
                Error::KeyDerivationFailed("parent secret has invalid length".into())
            })?;
        let subkey = mac.finalize().into_bytes();
        Ok(SecretBuffer::from_vec(subkey.as_slice().to_vec()))
    })??;

    tracing::trace!(index, context = %String::from_utf8_lossy(context), "derived subkey");
    Ok(derived)
}

// ============================================================================
// TESTS
// ============================================================================

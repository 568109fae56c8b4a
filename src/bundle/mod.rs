//! # Key Bundle
//!
//! A signing keypair and an encryption keypair behind one public
//! identity, with multi-recipient envelope encryption and
//! passphrase-protected persistence.
//!
//! ## Envelope Encryption
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ENVELOPE ENCRYPTION FLOW                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SENDER                                                                │
//! │  ──────                                                                 │
//! │  1. S = random 32-byte symmetric secret                                │
//! │  2. For each recipient R_i:                                            │
//! │       tx_i = server session key with R_i's encryption pubkey           │
//! │       (nonce_i, cipher_i) = AEAD(tx_i, S)                              │
//! │  3. (nonce_p, cipher_p) = AEAD(S, payload)                             │
//! │  4. envelope = [nonce_1, cipher_1, …, nonce_N, cipher_N,               │
//! │                 nonce_p, cipher_p]                                     │
//! │                                                                         │
//! │  RECIPIENT                                                             │
//! │  ─────────                                                              │
//! │  1. rx = client session key with the sender's encryption pubkey        │
//! │  2. Try each header pair; failures mean "not my slot" and are          │
//! │     skipped; the first pair that opens yields S                        │
//! │  3. No pair opens ──► NotARecipient                                    │
//! │  4. payload = AEAD⁻¹(S, nonce_p, cipher_p)                             │
//! │     failure ──► PayloadDecryptionFailed                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A recipient needs no a-priori knowledge of which slot is theirs, and
//! an eavesdropper learns only the recipient count.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::{Zeroize, Zeroizing};

use crate::blob::{BlobType, PersistenceBlob};
use crate::crypto::{
    self, EncryptionKey, EncryptionKeyPair, Nonce, PwHashLimits, Signature, SigningKeyPair,
};
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::mem::SecretBuffer;

/// Length of the envelope's symmetric secret
const SYM_SECRET_SIZE: usize = 32;

/// A signing keypair and an encryption keypair behind one identity.
///
/// Private keys are optional: a bundle reconstructed from a public
/// identity alone can verify signatures but cannot sign or decrypt.
pub struct KeyBundle {
    id: Identity,
    sign_priv: Option<SecretBuffer>,
    enc_priv: Option<SecretBuffer>,
}

impl KeyBundle {
    /// Derive a full bundle from a 32-byte seed.
    ///
    /// Both keypairs are generated deterministically from the same seed
    /// by independent constructions, so the same seed always reproduces
    /// the same identity.
    pub fn new_from_seed(seed: &SecretBuffer) -> Result<Self> {
        if seed.len() != SYM_SECRET_SIZE {
            return Err(Error::InvalidSeedInput(format!(
                "keypair seed must be {} bytes, got {}",
                SYM_SECRET_SIZE,
                seed.len()
            )));
        }

        let (signing, encryption) = seed.read(|s| {
            let mut bytes = Zeroizing::new([0u8; 32]);
            bytes.copy_from_slice(s);
            (
                SigningKeyPair::from_seed(&bytes),
                EncryptionKeyPair::from_seed(&bytes),
            )
        })?;

        let id = Identity::from_public_keys(signing.public_bytes(), encryption.public_bytes());
        let sign_priv = SecretBuffer::from_slice(&*signing.secret_bytes());
        let enc_priv = SecretBuffer::from_slice(&*encryption.secret_bytes());

        Ok(Self {
            id,
            sign_priv: Some(sign_priv),
            enc_priv: Some(enc_priv),
        })
    }

    /// Build a verification-only bundle from a public identity.
    pub fn from_public(id: &Identity) -> Self {
        Self {
            id: id.clone(),
            sign_priv: None,
            enc_priv: None,
        }
    }

    /// The public identity of this bundle.
    pub fn get_id(&self) -> &Identity {
        &self.id
    }

    // ========================================================================
    // SIGNING
    // ========================================================================

    /// Sign `data` with this bundle's signing key.
    pub fn sign(&self, data: &[u8]) -> Result<Signature> {
        let sign_priv = self
            .sign_priv
            .as_ref()
            .ok_or(Error::NoPrivateKey("signing"))?;

        sign_priv.read(|bytes| {
            let mut seed = Zeroizing::new([0u8; 32]);
            seed.copy_from_slice(bytes);
            crypto::sign(&SigningKeyPair::from_seed(&seed), data)
        })
    }

    /// Verify a third-party signature against an identity.
    ///
    /// Stateless: only the signing half of `identity` is used, never the
    /// local bundle's own keys.
    pub fn verify(signature: &Signature, data: &[u8], identity: &Identity) -> Result<bool> {
        crypto::verify(identity.signing_key(), data, signature)
    }

    // ========================================================================
    // ENVELOPE ENCRYPTION
    // ========================================================================

    /// Encrypt `data` so that any one of `recipients` can open it.
    pub fn encrypt(&self, recipients: &[Identity], data: &[u8]) -> Result<Vec<u8>> {
        let kp = self.encryption_keypair()?;

        let mut sym = SecretBuffer::secure(SYM_SECRET_SIZE);
        sym.randomize()?;

        // we act as the session "server", each recipient as a "client"
        let mut parts: Vec<Vec<u8>> = Vec::with_capacity(recipients.len() * 2 + 2);
        for recipient in recipients {
            let session = kp.server_session(recipient.encryption_key())?;
            let key = EncryptionKey::from_bytes(*session.tx());
            let (nonce, cipher) = sym.read(|s| crypto::encrypt(&key, s))??;
            parts.push(nonce.as_bytes().to_vec());
            parts.push(cipher);
        }

        let payload_key = sym.read(|s| {
            let mut k = [0u8; 32];
            k.copy_from_slice(s);
            EncryptionKey::from_bytes(k)
        })?;
        let (nonce, cipher) = crypto::encrypt(&payload_key, data)?;
        parts.push(nonce.as_bytes().to_vec());
        parts.push(cipher);

        sym.free()?;
        tracing::debug!(recipients = recipients.len(), "sealed envelope");
        Ok(bincode::serialize(&parts)?)
    }

    /// Open an envelope from `source`, trying every header slot.
    pub fn decrypt(&self, source: &Identity, cipher: &[u8]) -> Result<Vec<u8>> {
        let kp = self.encryption_keypair()?;

        let parts: Vec<Vec<u8>> = bincode::deserialize(cipher)
            .map_err(|e| Error::SerializationError(format!("malformed envelope: {}", e)))?;
        if parts.len() < 2 || parts.len() % 2 != 0 {
            return Err(Error::SerializationError(format!(
                "malformed envelope: {} segments",
                parts.len()
            )));
        }

        // the encryptor was the session "server"; we are a "client"
        let session = kp.client_session(source.encryption_key())?;
        let rx = EncryptionKey::from_bytes(*session.rx());

        let mut sym: Option<SecretBuffer> = None;
        for pair in parts[..parts.len() - 2].chunks_exact(2) {
            let nonce = match Nonce::from_slice(&pair[0]) {
                Ok(n) => n,
                Err(_) => continue,
            };
            // a slot that fails to open simply belongs to someone else
            match crypto::decrypt(&rx, &nonce, &pair[1]) {
                Ok(secret) if secret.len() == SYM_SECRET_SIZE => {
                    sym = Some(SecretBuffer::from_vec(secret));
                    // first slot that opens wins
                    break;
                }
                Ok(mut other) => other.zeroize(),
                Err(_) => {}
            }
        }
        let mut sym = sym.ok_or(Error::NotARecipient)?;

        let payload_nonce = Nonce::from_slice(&parts[parts.len() - 2])
            .map_err(|_| Error::PayloadDecryptionFailed)?;
        let payload_key = sym.read(|s| {
            let mut k = [0u8; 32];
            k.copy_from_slice(s);
            EncryptionKey::from_bytes(k)
        })?;
        let plaintext = crypto::decrypt(&payload_key, &payload_nonce, &parts[parts.len() - 1])
            .map_err(|_| Error::PayloadDecryptionFailed)?;

        sym.free()?;
        Ok(plaintext)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Export as a passphrase-encrypted blob (default cost).
    pub async fn get_bundle(&self, passphrase: &str, hint: &str) -> Result<PersistenceBlob> {
        self.get_bundle_with_limits(passphrase, hint, PwHashLimits::default())
            .await
    }

    /// Export as a passphrase-encrypted blob with explicit cost limits.
    ///
    /// The plaintext payload is the ordered 4-tuple
    /// `[sign_pub, enc_pub, sign_priv, enc_priv]`.
    pub async fn get_bundle_with_limits(
        &self,
        passphrase: &str,
        hint: &str,
        limits: PwHashLimits,
    ) -> Result<PersistenceBlob> {
        let sign_priv = self
            .sign_priv
            .as_ref()
            .ok_or(Error::NoPrivateKey("signing"))?
            .read(|b| b.to_vec())?;
        let enc_priv = self
            .enc_priv
            .as_ref()
            .ok_or(Error::NoPrivateKey("encryption"))?
            .read(|b| b.to_vec())?;

        let parts: Zeroizing<Vec<Vec<u8>>> = Zeroizing::new(vec![
            self.id.signing_key().to_vec(),
            self.id.encryption_key().to_vec(),
            sign_priv,
            enc_priv,
        ]);
        let payload = Zeroizing::new(bincode::serialize(&*parts)?);

        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let cipher =
            tokio::task::spawn_blocking(move || crypto::pw_enc(&payload, &passphrase, limits))
                .await??;

        tracing::debug!(id = %self.id, "key bundle exported to blob");
        Ok(PersistenceBlob::new(
            BlobType::Keypair,
            hint,
            STANDARD.encode(cipher),
        ))
    }

    /// Reconstruct a full bundle from a persistence blob.
    pub async fn from_bundle(blob: &PersistenceBlob, passphrase: &str) -> Result<Self> {
        if blob.type_tag()? != BlobType::Keypair {
            return Err(Error::UnknownBlobType(blob.blob_type.clone()));
        }

        let data = STANDARD
            .decode(&blob.data)
            .map_err(|_| Error::DecryptionFailed)?;
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let plaintext =
            tokio::task::spawn_blocking(move || crypto::pw_dec(&data, &passphrase)).await??;

        let mut parts: Vec<Vec<u8>> = bincode::deserialize(&plaintext)
            .map_err(|e| Error::SerializationError(format!("malformed key bundle: {}", e)))?;
        if parts.len() != 4 {
            let segments = parts.len();
            parts.zeroize();
            return Err(Error::SerializationError(format!(
                "key bundle must contain 4 segments, got {}",
                segments
            )));
        }

        let sign_pub: [u8; 32] = parts[0].as_slice().try_into().map_err(|_| {
            Error::SerializationError("signing public key must be 32 bytes".into())
        })?;
        let enc_pub: [u8; 32] = parts[1].as_slice().try_into().map_err(|_| {
            Error::SerializationError("encryption public key must be 32 bytes".into())
        })?;
        if parts[2].len() != 32 || parts[3].len() != 32 {
            parts.zeroize();
            return Err(Error::SerializationError(
                "private keys must be 32 bytes".into(),
            ));
        }

        let id = Identity::from_public_keys(sign_pub, enc_pub);
        let sign_priv = SecretBuffer::from_vec(std::mem::take(&mut parts[2]));
        let enc_priv = SecretBuffer::from_vec(std::mem::take(&mut parts[3]));

        tracing::debug!(id = %id, "key bundle restored from blob");
        Ok(Self {
            id,
            sign_priv: Some(sign_priv),
            enc_priv: Some(enc_priv),
        })
    }

    /// Synchronously zero both private keys and consume the bundle.
    pub fn destroy(mut self) {
        if let Some(mut buf) = self.sign_priv.take() {
            let _ = buf.free();
        }
        if let Some(mut buf) = self.enc_priv.take() {
            let _ = buf.free();
        }
    }

    /// Rebuild the encryption keypair from the stored private key.
    fn encryption_keypair(&self) -> Result<EncryptionKeyPair> {
        let enc_priv = self
            .enc_priv
            .as_ref()
            .ok_or(Error::NoPrivateKey("encryption"))?;
        enc_priv.read(|bytes| {
            let mut sk = Zeroizing::new([0u8; 32]);
            sk.copy_from_slice(bytes);
            EncryptionKeyPair::from_bytes(&sk)
        })
    }
}

impl std::fmt::Debug for KeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeyBundle({}, private: {})",
            self.id,
            self.sign_priv.is_some()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

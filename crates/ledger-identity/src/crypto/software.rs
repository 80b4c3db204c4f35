//! Ed25519 software keys.
//!
//! A minimal in-process key for callers that do not plug in an external
//! cryptographic suite. The SKI is SHA-256 of the public key bytes.

use std::fmt;
use std::sync::Arc;

use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::crypto::key::{Key, KeyHandle};
use crate::error::{IdentityError, Result};

fn ski_of(verifying_key: &VerifyingKey) -> Vec<u8> {
    Sha256::digest(verifying_key.as_bytes()).to_vec()
}

/// Private half of an Ed25519 key pair.
///
/// The signing key is never exported; `SigningKey` zeroizes itself on drop.
pub struct Ed25519PrivateKey {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519PrivateKey {
    /// Generate a new random Ed25519 key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Generate a key and wrap it in a [`KeyHandle`].
    pub fn generate_handle() -> KeyHandle {
        KeyHandle::new(Arc::new(Self::generate()))
    }

    /// Reconstruct a key from raw signing key bytes handed over by a key store.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Return the public half.
    pub fn public(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            verifying_key: self.verifying_key,
        }
    }
}

impl Key for Ed25519PrivateKey {
    fn bytes(&self) -> Result<Vec<u8>> {
        Err(IdentityError::KeyExportDenied)
    }

    fn ski(&self) -> Vec<u8> {
        ski_of(&self.verifying_key)
    }

    fn is_symmetric(&self) -> bool {
        false
    }

    fn is_private(&self) -> bool {
        true
    }

    fn public_key(&self) -> Result<Arc<dyn Key>> {
        Ok(Arc::new(self.public()))
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519PrivateKey")
            .field("ski", &hex::encode(self.ski()))
            .finish_non_exhaustive()
    }
}

/// Public half of an Ed25519 key pair.
#[derive(Debug, Clone)]
pub struct Ed25519PublicKey {
    verifying_key: VerifyingKey,
}

impl Ed25519PublicKey {
    /// Reconstruct a public key from raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| IdentityError::InvalidKey(format!("invalid verifying key: {e}")))?;
        Ok(Self { verifying_key })
    }
}

impl Key for Ed25519PublicKey {
    fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.verifying_key.to_bytes().to_vec())
    }

    fn ski(&self) -> Vec<u8> {
        ski_of(&self.verifying_key)
    }

    fn is_symmetric(&self) -> bool {
        false
    }

    fn is_private(&self) -> bool {
        false
    }

    fn public_key(&self) -> Result<Arc<dyn Key>> {
        Ok(Arc::new(self.clone()))
    }
}

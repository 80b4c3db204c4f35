//! Opaque key capability and the shared handle identities carry.
//!
//! A [`Key`] is issued and owned by the cryptographic subsystem. Identities
//! hold it through a [`KeyHandle`], which shares ownership via `Arc` and may
//! be null when an identity was rebuilt without key material.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A key managed by the cryptographic subsystem.
///
/// Implementations must refuse to hand out private key bytes: `bytes()` on
/// a private key returns [`IdentityError::KeyExportDenied`].
///
/// [`IdentityError::KeyExportDenied`]: crate::error::IdentityError::KeyExportDenied
pub trait Key: Send + Sync + fmt::Debug {
    /// Raw key bytes. Only public or otherwise exportable keys succeed.
    fn bytes(&self) -> Result<Vec<u8>>;

    /// Subject key identifier.
    fn ski(&self) -> Vec<u8>;

    /// Whether this is a symmetric key.
    fn is_symmetric(&self) -> bool;

    /// Whether this is the private half of an asymmetric pair.
    fn is_private(&self) -> bool;

    /// The corresponding public key.
    fn public_key(&self) -> Result<Arc<dyn Key>>;
}

/// Shared, nullable reference to a signing key.
///
/// Cloning a handle shares the same key; it never copies key material.
/// Check [`KeyHandle::is_valid`] before using a handle to sign.
#[derive(Clone, Default)]
pub struct KeyHandle(Option<Arc<dyn Key>>);

impl KeyHandle {
    /// Wrap a key issued by the cryptographic subsystem.
    pub fn new(key: Arc<dyn Key>) -> Self {
        Self(Some(key))
    }

    /// The handle of an identity that carries no key material.
    pub fn null() -> Self {
        Self(None)
    }

    /// Return `true` if the handle refers to a key.
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Borrow the underlying key, if any.
    pub fn key(&self) -> Option<&Arc<dyn Key>> {
        self.0.as_ref()
    }

    /// Subject key identifier of the referenced key.
    pub fn ski(&self) -> Option<Vec<u8>> {
        self.0.as_ref().map(|k| k.ski())
    }

    /// Return `true` if both handles refer to the same key instance.
    pub fn same_key(&self, other: &KeyHandle) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl From<Arc<dyn Key>> for KeyHandle {
    fn from(key: Arc<dyn Key>) -> Self {
        Self::new(key)
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ski() {
            Some(ski) => write!(f, "KeyHandle(ski={})", hex::encode(ski)),
            None => write!(f, "KeyHandle(null)"),
        }
    }
}

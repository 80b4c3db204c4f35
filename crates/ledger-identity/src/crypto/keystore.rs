//! Key resolution by subject key identifier.
//!
//! Durable user stores persist only a key's SKI. On load they hand the SKI
//! to an injected [`KeyResolver`], typically the crypto suite's own key
//! store, to rebind the identity's [`KeyHandle`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::crypto::key::{Key, KeyHandle};
use crate::error::{IdentityError, Result};

/// Rebinds persisted key references to live key handles.
pub trait KeyResolver: Send + Sync {
    /// Look up a key by SKI. `Ok(None)` means the resolver does not know it.
    fn resolve(&self, ski: &[u8]) -> Result<Option<KeyHandle>>;
}

/// In-process key registry indexed by SKI.
///
/// Holds shared references only; dropping the store drops its references,
/// not the keys other holders still use.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<Vec<u8>, Arc<dyn Key>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key under its SKI, replacing any previous entry.
    pub fn register(&self, key: Arc<dyn Key>) -> Result<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| IdentityError::InvalidKey(format!("key store lock poisoned: {e}")))?;
        keys.insert(key.ski(), key);
        Ok(())
    }

    /// Register the key behind a handle. Null handles are rejected.
    pub fn register_handle(&self, handle: &KeyHandle) -> Result<()> {
        let key = handle
            .key()
            .ok_or_else(|| IdentityError::InvalidKey("cannot register a null key handle".into()))?;
        self.register(Arc::clone(key))
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyResolver for MemoryKeyStore {
    fn resolve(&self, ski: &[u8]) -> Result<Option<KeyHandle>> {
        let keys = self
            .keys
            .read()
            .map_err(|e| IdentityError::InvalidKey(format!("key store lock poisoned: {e}")))?;
        Ok(keys.get(ski).cloned().map(KeyHandle::new))
    }
}

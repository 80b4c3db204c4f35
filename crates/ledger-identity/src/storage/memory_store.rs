//! In-memory user store.
//!
//! Keeps `UserIdentity` values in a `HashMap` behind an `RwLock`. Key
//! handles are kept by reference, so a loaded identity can still sign.
//! Contents are dropped on close and on process exit.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{IdentityError, Result};
use crate::identity::{User, UserIdentity, UserKey};
use crate::storage::{sort_keys, validate_for_store, UserStore};

/// `None` once the store is closed.
type Entries = Option<HashMap<UserKey, UserIdentity>>;

/// In-memory [`UserStore`].
pub struct MemoryUserStore {
    entries: RwLock<Entries>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Some(HashMap::new())),
        }
    }

    /// Number of stored identities. Zero once closed.
    pub fn len(&self) -> usize {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryUserStore {
    fn store(&self, user: &dyn User) -> Result<()> {
        validate_for_store(user)?;
        let identity = UserIdentity::from_user(user);
        let key = identity.user_key();

        let mut guard = self
            .entries
            .write()
            .map_err(|e| IdentityError::StoreWriteFailure(format!("lock poisoned: {e}")))?;
        let entries = guard.as_mut().ok_or(IdentityError::StoreClosed)?;

        if entries.insert(key.clone(), identity).is_some() {
            log::debug!("memory store: replaced {key}");
        } else {
            log::debug!("memory store: stored {key}");
        }
        Ok(())
    }

    fn load(&self, key: &UserKey) -> Result<UserIdentity> {
        let guard = self
            .entries
            .read()
            .map_err(|e| IdentityError::StoreReadFailure(format!("lock poisoned: {e}")))?;
        let entries = guard.as_ref().ok_or(IdentityError::StoreClosed)?;

        entries
            .get(key)
            .cloned()
            .ok_or_else(|| IdentityError::UserNotFound(key.clone()))
    }

    fn remove(&self, key: &UserKey) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|e| IdentityError::StoreWriteFailure(format!("lock poisoned: {e}")))?;
        let entries = guard.as_mut().ok_or(IdentityError::StoreClosed)?;

        match entries.remove(key) {
            Some(_) => {
                log::debug!("memory store: removed {key}");
                Ok(())
            }
            None => Err(IdentityError::UserNotFound(key.clone())),
        }
    }

    fn keys(&self) -> Result<Vec<UserKey>> {
        let guard = self
            .entries
            .read()
            .map_err(|e| IdentityError::StoreReadFailure(format!("lock poisoned: {e}")))?;
        let entries = guard.as_ref().ok_or(IdentityError::StoreClosed)?;

        let mut keys: Vec<UserKey> = entries.keys().cloned().collect();
        sort_keys(&mut keys);
        Ok(keys)
    }

    fn close(&self) {
        // A poisoned lock still gets torn down.
        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

//! Storage layer for user identities.
//!
//! [`UserStore`] is the persistence contract; callers pick a backend at
//! construction time and pass it around as `&dyn UserStore` or a generic.
//!
//! # Backends
//!
//! - [`memory_store`]: `HashMap` behind a lock, for tests and short-lived
//!   processes.
//! - [`file_store`]: one JSON file per identity, atomic replace on write.
//!
//! # Directory layout (file backend)
//!
//! ```text
//! {base_dir}/
//! ├── {sha256(msp_id, name)}.json
//! └── {sha256(msp_id, name)}.json
//! ```
//!
//! Private key bytes are never written by any backend. The file backend
//! records the key's SKI and rebinds it through a [`KeyResolver`] on load.
//!
//! [`KeyResolver`]: crate::crypto::KeyResolver

pub mod file_store;
pub mod memory_store;

pub use file_store::{FileUserStore, UserFile};
pub use memory_store::MemoryUserStore;

use crate::error::{IdentityError, Result};
use crate::identity::{User, UserIdentity, UserKey};

/// Persistence contract for user identities.
///
/// Implementations must be safe to share across threads. Writes to the same
/// key are last-writer-wins by completion order, reads never observe a
/// partial write, and a `load` that starts after a successful `store`
/// returns observes that write or a later one.
pub trait UserStore: Send + Sync {
    /// Persist `user` under `(msp_id, name)`, overwriting any previous entry.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` for an empty membership id, `StoreWriteFailure` on
    /// backend failure, `StoreClosed` after [`UserStore::close`].
    fn store(&self, user: &dyn User) -> Result<()>;

    /// Load the identity stored under exactly `key`.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if nothing is stored under `key`, `StoreReadFailure`
    /// on backend or decoding failure, `StoreClosed` after close.
    fn load(&self, key: &UserKey) -> Result<UserIdentity>;

    /// Remove the identity stored under `key`.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if nothing is stored under `key`.
    fn remove(&self, key: &UserKey) -> Result<()>;

    /// All stored keys, sorted by membership id then name.
    fn keys(&self) -> Result<Vec<UserKey>>;

    /// Tear the store down. Idempotent.
    fn close(&self);
}

/// Store-level validation shared by all backends.
pub(crate) fn validate_for_store(user: &dyn User) -> Result<()> {
    if user.msp_id().is_empty() {
        return Err(IdentityError::InvalidIdentity(
            "membership id must not be empty".into(),
        ));
    }
    Ok(())
}

pub(crate) fn sort_keys(keys: &mut [UserKey]) {
    keys.sort_by(|a, b| (&a.msp_id, &a.name).cmp(&(&b.msp_id, &b.name)));
}

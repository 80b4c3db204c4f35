//! ledger-identity: client identities for permissioned ledger networks.
//!
//! Models the bundle a participant needs to submit signed transactions
//! (membership id, enrollment certificate, signing-key handle, roles) and
//! persists it behind a pluggable store contract addressed by
//! `(membership id, name)`.
//!
//! Certificate issuance, signing, and transport live elsewhere; this crate
//! only carries an opaque [`KeyHandle`] and never exports private key bytes.

pub mod crypto;
pub mod error;
pub mod identity;
pub mod storage;
pub mod time;

// Re-export primary types
pub use crypto::{Key, KeyHandle, KeyResolver, MemoryKeyStore};
pub use error::{IdentityError, Result};
pub use identity::{IdentityContext, SerializedIdentity, User, UserIdentity, UserKey};
pub use storage::{FileUserStore, MemoryUserStore, UserStore};

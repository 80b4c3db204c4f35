//! Error types for ledger-identity.
//!
//! All errors are returned as values; nothing here aborts the process.
//! Private key material is never included in error messages.

use crate::identity::UserKey;

/// Identity error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No identity is stored under the exact lookup key.
    ///
    /// Expected and recoverable: callers typically react by enrolling.
    #[error("user not found: {0}")]
    UserNotFound(UserKey),

    /// The serialized identity cannot be produced from the current state.
    #[error("identity unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("private key material cannot be exported from a key handle")]
    KeyExportDenied,

    #[error("store write failure: {0}")]
    StoreWriteFailure(String),

    #[error("store read failure: {0}")]
    StoreReadFailure(String),

    #[error("store closed")]
    StoreClosed,
}

impl IdentityError {
    /// Return `true` for the "not found" outcome of a lookup.
    ///
    /// Lets callers branch on "trigger enrollment" vs. "store is broken"
    /// without matching on every variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, IdentityError>;

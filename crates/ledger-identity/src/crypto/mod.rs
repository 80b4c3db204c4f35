//! Key-handle boundary for ledger-identity.
//!
//! This module provides:
//! - The opaque [`Key`] capability and the shared, nullable [`KeyHandle`]
//! - An Ed25519 software key for callers without an external crypto suite
//! - The [`KeyResolver`] channel used to rebind persisted key references
//! - Cryptographically secure random number generation
//!
//! Nothing here signs, encrypts, or exports private key bytes.

pub mod key;
pub mod keystore;
pub mod random;
pub mod software;

pub use key::{Key, KeyHandle};
pub use keystore::{KeyResolver, MemoryKeyStore};
pub use software::{Ed25519PrivateKey, Ed25519PublicKey};

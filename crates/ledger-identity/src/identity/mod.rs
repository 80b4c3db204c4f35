//! Identity abstraction: what a participant presents to the ledger.
//!
//! The capability traits [`IdentityContext`] and [`User`] describe any
//! identity, regardless of where it came from. [`UserIdentity`] is the
//! concrete value the stores hand back, and [`UserKey`] addresses it.

pub mod context;
pub mod user;
pub mod user_key;

pub use context::{IdentityContext, User};
pub use user::{SerializedIdentity, UserIdentity, UserIdentityBuilder};
pub use user_key::UserKey;

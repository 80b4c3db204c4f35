//! Composite lookup key for stored identities.

use serde::{Deserialize, Serialize};

/// Address of one identity in a store: `(msp_id, name)`.
///
/// Equality and hashing are structural over both fields, case-sensitive,
/// with no normalization. Empty fields are allowed here; rejecting them is
/// store policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserKey {
    pub msp_id: String,
    pub name: String,
}

impl UserKey {
    pub fn new(msp_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.msp_id)
    }
}

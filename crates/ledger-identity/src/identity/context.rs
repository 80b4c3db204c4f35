//! Capability traits for identities.

use crate::crypto::KeyHandle;
use crate::error::Result;
use crate::identity::UserKey;

/// Supplies the serialized identity and key reference used when signing.
pub trait IdentityContext: Send + Sync {
    /// Membership service provider id the identity belongs to.
    fn msp_id(&self) -> &str;

    /// Wire-form identity blob.
    ///
    /// Fails with `IdentityUnavailable` when the backing material is absent.
    fn identity(&self) -> Result<Vec<u8>>;

    /// Handle to the private signing key. May be null; check
    /// [`KeyHandle::is_valid`] before signing.
    fn private_key(&self) -> KeyHandle;
}

/// An enrolled participant: an identity context plus a name, the enrollment
/// certificate backing it, and its role labels.
pub trait User: IdentityContext {
    /// Name, unique within the membership id.
    fn name(&self) -> &str;

    /// Raw enrollment certificate bytes.
    fn enrollment_certificate(&self) -> &[u8];

    /// Role labels in insertion order.
    fn roles(&self) -> &[String];

    /// Lookup key this user is stored under.
    fn user_key(&self) -> UserKey {
        UserKey::new(self.msp_id(), self.name())
    }
}

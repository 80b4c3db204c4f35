//! Concrete user identity and its wire form.

use serde::{Deserialize, Serialize};

use crate::crypto::KeyHandle;
use crate::error::{IdentityError, Result};
use crate::identity::{IdentityContext, User};

/// Wire-form identity: the membership id plus the enrollment certificate.
///
/// Encoded as JSON with the certificate in base64. Carries no key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub mspid: String,
    pub id_bytes: String,
}

impl SerializedIdentity {
    /// Build the wire form for a membership id and certificate.
    pub fn new(msp_id: &str, certificate: &[u8]) -> Self {
        Self {
            mspid: msp_id.to_string(),
            id_bytes: base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                certificate,
            ),
        }
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| IdentityError::IdentityUnavailable(format!("encode failed: {e}")))
    }

    /// Parse bytes produced by [`SerializedIdentity::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| IdentityError::InvalidIdentity(format!("malformed serialized identity: {e}")))
    }

    /// Decode the certificate bytes.
    pub fn certificate(&self) -> Result<Vec<u8>> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.id_bytes)
            .map_err(|e| IdentityError::InvalidIdentity(format!("invalid id_bytes base64: {e}")))
    }
}

/// An enrolled user. Immutable once built.
///
/// The key handle is shared with the cryptographic subsystem that issued it;
/// cloning a `UserIdentity` shares it again rather than copying key material.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    msp_id: String,
    name: String,
    enrollment_certificate: Vec<u8>,
    private_key: KeyHandle,
    roles: Vec<String>,
}

impl UserIdentity {
    /// Start building an identity for `name` within `msp_id`.
    pub fn builder(msp_id: impl Into<String>, name: impl Into<String>) -> UserIdentityBuilder {
        UserIdentityBuilder::new(msp_id, name)
    }

    /// Snapshot any [`User`] into the concrete type.
    pub fn from_user(user: &dyn User) -> Self {
        Self {
            msp_id: user.msp_id().to_string(),
            name: user.name().to_string(),
            enrollment_certificate: user.enrollment_certificate().to_vec(),
            private_key: user.private_key(),
            roles: user.roles().to_vec(),
        }
    }

    /// Return a copy of this identity bound to another key handle.
    pub fn with_private_key(&self, handle: KeyHandle) -> Self {
        Self {
            private_key: handle,
            ..self.clone()
        }
    }
}

impl IdentityContext for UserIdentity {
    fn msp_id(&self) -> &str {
        &self.msp_id
    }

    fn identity(&self) -> Result<Vec<u8>> {
        if self.enrollment_certificate.is_empty() {
            return Err(IdentityError::IdentityUnavailable(format!(
                "no enrollment certificate for {}",
                self.user_key()
            )));
        }
        SerializedIdentity::new(&self.msp_id, &self.enrollment_certificate).to_bytes()
    }

    fn private_key(&self) -> KeyHandle {
        self.private_key.clone()
    }
}

impl User for UserIdentity {
    fn name(&self) -> &str {
        &self.name
    }

    fn enrollment_certificate(&self) -> &[u8] {
        &self.enrollment_certificate
    }

    fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// Builder for [`UserIdentity`].
#[derive(Debug)]
pub struct UserIdentityBuilder {
    msp_id: String,
    name: String,
    enrollment_certificate: Vec<u8>,
    private_key: KeyHandle,
    roles: Vec<String>,
}

impl UserIdentityBuilder {
    /// Start building an identity for `name` within `msp_id`.
    pub fn new(msp_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            name: name.into(),
            enrollment_certificate: Vec::new(),
            private_key: KeyHandle::null(),
            roles: Vec::new(),
        }
    }

    /// Set the enrollment certificate bytes.
    pub fn enrollment_certificate(mut self, cert: impl Into<Vec<u8>>) -> Self {
        self.enrollment_certificate = cert.into();
        self
    }

    /// Attach the signing key handle.
    pub fn private_key(mut self, handle: KeyHandle) -> Self {
        self.private_key = handle;
        self
    }

    /// Append a role label.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Append several role labels, keeping their order.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Build the identity.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidIdentity` if the membership id is empty.
    pub fn build(self) -> Result<UserIdentity> {
        if self.msp_id.is_empty() {
            return Err(IdentityError::InvalidIdentity(
                "membership id must not be empty".into(),
            ));
        }
        Ok(UserIdentity {
            msp_id: self.msp_id,
            name: self.name,
            enrollment_certificate: self.enrollment_certificate,
            private_key: self.private_key,
            roles: self.roles,
        })
    }
}

//! File-backed user store, one JSON file per identity.
//!
//! Files are named from a SHA-256 over the length-prefixed membership id
//! and name, so every `(msp_id, name)` pair maps to one filesystem-safe
//! name and pairs from different organizations never collide.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "lid-user-v1",
//!     "msp_id": "Org1MSP",
//!     "name": "admin",
//!     "enrollment_certificate": "<base64>",
//!     "roles": ["admin"],
//!     "key_ski": "<hex>",
//!     "stored_at": 1700000000000000
//! }
//! ```
//!
//! `key_ski` is a reference only. Private key bytes are never written; on
//! load the handle is rebound through the configured [`KeyResolver`], and
//! without one the loaded identity carries a null handle.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::{random, KeyHandle, KeyResolver};
use crate::error::{IdentityError, Result};
use crate::identity::{User, UserIdentity, UserKey};
use crate::storage::{sort_keys, validate_for_store, UserStore};

// ── File format constants ─────────────────────────────────────────────────────

const USER_FILE_VERSION: u32 = 1;
const USER_FILE_FORMAT: &str = "lid-user-v1";
const USER_FILE_EXT: &str = "json";
const TMP_EXT: &str = "tmp";

// ── On-disk structure ─────────────────────────────────────────────────────────

/// Structure written to disk for each stored identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserFile {
    /// Format version number.
    pub version: u32,
    /// Format identifier string.
    pub format: String,
    pub msp_id: String,
    pub name: String,
    /// Base64-encoded enrollment certificate.
    pub enrollment_certificate: String,
    pub roles: Vec<String>,
    /// Hex SKI of the signing key, when the identity had a valid handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ski: Option<String>,
    /// Write timestamp (microseconds since Unix epoch).
    pub stored_at: u64,
}

impl UserFile {
    fn from_user(user: &dyn User) -> Self {
        Self {
            version: USER_FILE_VERSION,
            format: USER_FILE_FORMAT.to_string(),
            msp_id: user.msp_id().to_string(),
            name: user.name().to_string(),
            enrollment_certificate: base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                user.enrollment_certificate(),
            ),
            roles: user.roles().to_vec(),
            key_ski: user.private_key().ski().map(hex::encode),
            stored_at: crate::time::now_micros(),
        }
    }

    fn user_key(&self) -> UserKey {
        UserKey::new(&self.msp_id, &self.name)
    }
}

// ── FileUserStore ─────────────────────────────────────────────────────────────

/// Filesystem-backed [`UserStore`].
///
/// Every write goes to a uniquely named sibling temp file that is then
/// renamed over the target, so readers see either the old or the new file
/// and concurrent writers to one key resolve to the last rename.
pub struct FileUserStore {
    base_dir: PathBuf,
    key_resolver: Option<Arc<dyn KeyResolver>>,
    closed: AtomicBool,
}

impl FileUserStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::StoreWriteFailure` if the directory cannot be
    /// created.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir).map_err(|e| {
            IdentityError::StoreWriteFailure(format!(
                "cannot create store directory {}: {e}",
                base_dir.display()
            ))
        })?;
        log::debug!("file store: opened {}", base_dir.display());
        Ok(Self {
            base_dir,
            key_resolver: None,
            closed: AtomicBool::new(false),
        })
    }

    /// Rebind persisted key references through `resolver` on load.
    pub fn with_key_resolver(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }

    /// Root directory of this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File name used for `key`: hex SHA-256 of the length-prefixed fields.
    pub fn file_name(key: &UserKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update((key.msp_id.len() as u64).to_be_bytes());
        hasher.update(key.msp_id.as_bytes());
        hasher.update(key.name.as_bytes());
        format!("{}.{USER_FILE_EXT}", hex::encode(hasher.finalize()))
    }

    /// Full path of the file for `key`.
    pub fn user_path(&self, key: &UserKey) -> PathBuf {
        self.base_dir.join(Self::file_name(key))
    }

    /// The raw stored record for `key`, for operator tooling that wants the
    /// write timestamp or key reference without rebinding the key.
    ///
    /// # Errors
    ///
    /// Same as [`UserStore::load`].
    pub fn record(&self, key: &UserKey) -> Result<UserFile> {
        self.ensure_open()?;
        self.read_user_file(key)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(IdentityError::StoreClosed);
        }
        Ok(())
    }

    /// Raw bytes of the file for `key`.
    fn read_user_bytes(&self, key: &UserKey, path: &Path) -> Result<Vec<u8>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IdentityError::UserNotFound(key.clone()))
            }
            Err(e) => Err(IdentityError::StoreReadFailure(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Read and validate the file for `key`. The stored key must match.
    fn read_user_file(&self, key: &UserKey) -> Result<UserFile> {
        let path = self.user_path(key);
        let bytes = self.read_user_bytes(key, &path)?;
        let file = parse_user_file(&path, &bytes)?;
        check_addressed(&path, &file, key)?;
        Ok(file)
    }

    fn bind_key(&self, file: &UserFile) -> Result<KeyHandle> {
        let Some(ski_hex) = file.key_ski.as_deref() else {
            return Ok(KeyHandle::null());
        };
        let key = file.user_key();
        let ski = hex::decode(ski_hex).map_err(|e| {
            IdentityError::StoreReadFailure(format!("invalid key_ski for {key}: {e}"))
        })?;

        let Some(resolver) = self.key_resolver.as_ref() else {
            log::warn!("file store: no key resolver, {key} loaded without signing key");
            return Ok(KeyHandle::null());
        };

        match resolver.resolve(&ski) {
            Ok(Some(handle)) => Ok(handle),
            Ok(None) => {
                log::warn!("file store: key {ski_hex} for {key} is not known to the resolver");
                Ok(KeyHandle::null())
            }
            Err(e) => Err(IdentityError::StoreReadFailure(format!(
                "key resolution failed for {key}: {e}"
            ))),
        }
    }
}

impl UserStore for FileUserStore {
    fn store(&self, user: &dyn User) -> Result<()> {
        self.ensure_open()?;
        validate_for_store(user)?;

        let file = UserFile::from_user(user);
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| IdentityError::StoreWriteFailure(format!("serialization failed: {e}")))?;

        let key = file.user_key();
        write_atomic(&self.user_path(&key), &json)?;
        log::debug!("file store: stored {key}");
        Ok(())
    }

    fn load(&self, key: &UserKey) -> Result<UserIdentity> {
        self.ensure_open()?;
        let file = self.read_user_file(key)?;

        let certificate = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            &file.enrollment_certificate,
        )
        .map_err(|e| {
            IdentityError::StoreReadFailure(format!("invalid certificate base64 for {key}: {e}"))
        })?;
        let handle = self.bind_key(&file)?;

        let identity = UserIdentity::builder(file.msp_id, file.name)
            .enrollment_certificate(certificate)
            .roles(file.roles)
            .private_key(handle)
            .build()
            .map_err(|e| IdentityError::StoreReadFailure(e.to_string()))?;

        log::debug!("file store: loaded {key}");
        Ok(identity)
    }

    fn remove(&self, key: &UserKey) -> Result<()> {
        self.ensure_open()?;
        let path = self.user_path(key);

        // A record that parses must belong to `key`; one that does not parse
        // is cleared so it can be re-enrolled.
        let bytes = self.read_user_bytes(key, &path)?;
        match parse_user_file(&path, &bytes) {
            Ok(file) => check_addressed(&path, &file, key)?,
            Err(e) => log::warn!("file store: removing unreadable record for {key}: {e}"),
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("file store: removed {key}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IdentityError::UserNotFound(key.clone()))
            }
            Err(e) => Err(IdentityError::StoreWriteFailure(format!(
                "cannot remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn keys(&self) -> Result<Vec<UserKey>> {
        self.ensure_open()?;

        let entries = std::fs::read_dir(&self.base_dir).map_err(|e| {
            IdentityError::StoreReadFailure(format!(
                "cannot list {}: {e}",
                self.base_dir.display()
            ))
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| IdentityError::StoreReadFailure(e.to_string()))?
                .path();
            if path.extension().map(|x| x != USER_FILE_EXT).unwrap_or(true) {
                continue;
            }
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                // Removed concurrently.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(IdentityError::StoreReadFailure(format!(
                        "cannot read {}: {e}",
                        path.display()
                    )))
                }
            };
            let key = match parse_user_file(&path, &bytes) {
                Ok(file) => file.user_key(),
                Err(e) => {
                    log::warn!("file store: skipping {e}");
                    continue;
                }
            };
            let expected = Self::file_name(&key);
            if path.file_name().and_then(|n| n.to_str()) != Some(expected.as_str()) {
                log::warn!(
                    "file store: skipping {}, it holds {key} which belongs in {expected}",
                    path.display()
                );
                continue;
            }
            keys.push(key);
        }

        sort_keys(&mut keys);
        Ok(keys)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("file store: closed {}", self.base_dir.display());
        }
    }
}

fn check_addressed(path: &Path, file: &UserFile, key: &UserKey) -> Result<()> {
    if file.user_key() != *key {
        return Err(IdentityError::StoreReadFailure(format!(
            "{} holds {} but was addressed as {key}",
            path.display(),
            file.user_key()
        )));
    }
    Ok(())
}

fn parse_user_file(path: &Path, bytes: &[u8]) -> Result<UserFile> {
    let file: UserFile = serde_json::from_slice(bytes).map_err(|e| {
        IdentityError::StoreReadFailure(format!("failed to parse {}: {e}", path.display()))
    })?;

    if file.version != USER_FILE_VERSION || file.format != USER_FILE_FORMAT {
        return Err(IdentityError::StoreReadFailure(format!(
            "unsupported user file version={} format={} in {}",
            file.version,
            file.format,
            path.display()
        )));
    }
    Ok(file)
}

/// Write `data` to `path` atomically using a uniquely named sibling temp file.
///
/// The temp file is synced before the rename so a crash cannot leave a
/// partially-written file visible to readers.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let write_err = |e: std::io::Error| {
        IdentityError::StoreWriteFailure(format!("cannot write {}: {e}", path.display()))
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(
        ".{file_name}.{}.{TMP_EXT}",
        random::random_hex::<8>()
    ));

    let result = (|| -> std::io::Result<()> {
        let mut tmp = std::fs::File::create(&tmp_path)?;
        tmp.write_all(data)?;
        tmp.sync_all()?;
        std::fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

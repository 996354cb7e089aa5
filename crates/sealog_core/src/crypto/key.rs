//! Key material and its on-disk lifecycle.

use crate::error::{CoreError, CoreResult};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Accepted key lengths in bytes (AES-128, AES-192, AES-256).
pub const VALID_KEY_SIZES: [usize; 3] = [16, 24, 32];
/// Length of newly generated keys.
pub const DEFAULT_KEY_SIZE: usize = 32;
/// Number of hex characters in a key fingerprint.
pub const FINGERPRINT_LEN: usize = 16;

/// Symmetric key for the record cipher.
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: Vec<u8>,
}

impl EncryptionKey {
    /// Generates a new random 32-byte key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; DEFAULT_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the slice is 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if !VALID_KEY_SIZES.contains(&bytes.len()) {
            return Err(CoreError::invalid_key_length(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a valid key is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a short identifier for the key: the first 16 hex characters of
    /// its SHA-256 digest.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        hex
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Loads and creates the persisted key file.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyManager;

impl KeyManager {
    /// Loads the key at `path`, creating it first if it does not exist.
    ///
    /// A new key is 32 random bytes. Its file is restricted to the owner on a
    /// best-effort basis; failing to do so is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an existing key file has an invalid
    /// length, or an I/O error if the file cannot be read or written.
    pub fn load_or_create(path: &Path) -> CoreResult<EncryptionKey> {
        if path.exists() {
            let mut data = fs::read(path)?;
            let key = EncryptionKey::from_bytes(&data);
            data.zeroize();
            return key;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let key = EncryptionKey::generate();
        fs::write(path, key.as_bytes())?;
        restrict_permissions(path);
        info!(path = %path.display(), fingerprint = %key.fingerprint(), "created new key");
        Ok(key)
    }

    /// Returns the fingerprint of `key`.
    #[must_use]
    pub fn fingerprint(key: &EncryptionKey) -> String {
        key.fingerprint()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %err, "could not restrict key file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path) {
    warn!(path = %path.display(), "key file permissions left to platform defaults");
}

//! Cryptographic operations for SealLog.
//!
//! Every record is encrypted on its own with AES-GCM. The AES variant follows
//! the key length (16, 24 or 32 bytes).
//!
//! ## Security Model
//!
//! - Unique random nonce per record
//! - Authentication tag checked before any plaintext is returned
//! - Keys are zeroized on drop and redacted from `Debug`
//! - The key file is created owner-readable only
//!
//! ## Blob Layout (format version 1)
//!
//! ```text
//! base64( nonce (16) || tag (16) || ciphertext (N) )
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use sealog_core::crypto::{KeyManager, RecordCipher};
//!
//! let key = KeyManager::load_or_create(Path::new("config/.key"))?;
//! let cipher = RecordCipher::new(&key)?;
//!
//! let blob = cipher.encrypt(b"secret data")?;
//! let plaintext = cipher.decrypt(&blob)?;
//! ```

mod cipher;
mod key;

pub use cipher::{RecordCipher, HEADER_SIZE, NONCE_SIZE, TAG_SIZE};
pub use key::{EncryptionKey, KeyManager, DEFAULT_KEY_SIZE, FINGERPRINT_LEN, VALID_KEY_SIZES};

//! Per-record AES-GCM encryption.

use crate::crypto::key::EncryptionKey;
use crate::error::{CoreError, CoreResult};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use aes_gcm::{AesGcm, Nonce, Tag};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 16;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// Size of the fixed blob header (nonce followed by tag).
pub const HEADER_SIZE: usize = NONCE_SIZE + TAG_SIZE;

type Aes128Gcm16 = AesGcm<Aes128, U16>;
type Aes192Gcm16 = AesGcm<Aes192, U16>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;

enum Variant {
    Aes128(Box<Aes128Gcm16>),
    Aes192(Box<Aes192Gcm16>),
    Aes256(Box<Aes256Gcm16>),
}

macro_rules! with_cipher {
    ($variant:expr, $cipher:ident => $body:expr) => {
        match $variant {
            Variant::Aes128($cipher) => $body,
            Variant::Aes192($cipher) => $body,
            Variant::Aes256($cipher) => $body,
        }
    };
}

/// Encrypts and decrypts single records.
///
/// Output of [`encrypt`](Self::encrypt) is one base64 line:
/// `nonce (16 bytes) || tag (16 bytes) || ciphertext`. The plaintext length
/// equals the ciphertext length; nothing is compressed or padded.
pub struct RecordCipher {
    variant: Variant,
    fingerprint: String,
}

impl RecordCipher {
    /// Creates a cipher for the given key. The AES variant follows the key
    /// length.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key length is unsupported.
    pub fn new(key: &EncryptionKey) -> CoreResult<Self> {
        let bytes = key.as_bytes();
        let invalid = |_| CoreError::invalid_key_length(bytes.len());
        let variant = match bytes.len() {
            16 => Variant::Aes128(Box::new(Aes128Gcm16::new_from_slice(bytes).map_err(invalid)?)),
            24 => Variant::Aes192(Box::new(Aes192Gcm16::new_from_slice(bytes).map_err(invalid)?)),
            32 => Variant::Aes256(Box::new(Aes256Gcm16::new_from_slice(bytes).map_err(invalid)?)),
            other => return Err(CoreError::invalid_key_length(other)),
        };
        Ok(Self {
            variant,
            fingerprint: key.fingerprint(),
        })
    }

    /// Returns the fingerprint of the key this cipher was built from.
    #[must_use]
    pub fn key_fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Encrypts `plaintext` under a fresh random nonce and returns the base64
    /// blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the AEAD rejects the input (only possible for
    /// inputs far beyond any record size).
    pub fn encrypt(&self, plaintext: &[u8]) -> CoreResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::<U16>::from_slice(&nonce_bytes);

        let mut packed = Vec::with_capacity(HEADER_SIZE + plaintext.len());
        packed.extend_from_slice(&nonce_bytes);
        packed.extend_from_slice(&[0u8; TAG_SIZE]);
        packed.extend_from_slice(plaintext);

        let tag = with_cipher!(&self.variant, cipher => {
            cipher.encrypt_in_place_detached(nonce, b"", &mut packed[HEADER_SIZE..])
        })
        .map_err(|_| CoreError::encryption_failed("encryption error"))?;
        packed[NONCE_SIZE..HEADER_SIZE].copy_from_slice(&tag);

        Ok(STANDARD.encode(packed))
    }

    /// Decrypts a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Surrounding ASCII whitespace is ignored. Plaintext is only returned
    /// after the authentication tag has been verified.
    ///
    /// # Errors
    ///
    /// Returns an integrity error for invalid base64, a blob shorter than the
    /// header, a wrong key, or any altered byte.
    pub fn decrypt(&self, blob: impl AsRef<[u8]>) -> CoreResult<Vec<u8>> {
        let data = STANDARD
            .decode(blob.as_ref().trim_ascii())
            .map_err(|err| CoreError::integrity(format!("invalid base64: {err}")))?;

        if data.len() < HEADER_SIZE {
            return Err(CoreError::integrity(format!(
                "blob too short: {} bytes, header needs {HEADER_SIZE}",
                data.len()
            )));
        }

        let nonce = Nonce::<U16>::from_slice(&data[..NONCE_SIZE]);
        let tag = Tag::<U16>::from_slice(&data[NONCE_SIZE..HEADER_SIZE]);
        let mut buffer = data[HEADER_SIZE..].to_vec();

        let verified = with_cipher!(&self.variant, cipher => {
            cipher.decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
        });
        verified.map_err(|_| CoreError::integrity("authentication tag mismatch"))?;

        Ok(buffer)
    }
}

impl std::fmt::Debug for RecordCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.variant {
            Variant::Aes128(_) => "Aes128Gcm",
            Variant::Aes192(_) => "Aes192Gcm",
            Variant::Aes256(_) => "Aes256Gcm",
        };
        f.debug_struct("RecordCipher")
            .field("cipher", &name)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

//! Error types for SealLog core.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in SealLog core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error on read, write, rename or delete.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record field normalization error.
    #[error("codec error: {0}")]
    Codec(#[from] sealog_codec::CodecError),

    /// Persisted key material or store settings are invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// Authentication tag failure or corrupted/truncated blob.
    #[error("integrity error: {message}")]
    Integrity {
        /// Description of the failure.
        message: String,
    },

    /// Payload is not shaped as expected.
    #[error("format error: {message}")]
    Format {
        /// Description of the format issue.
        message: String,
    },

    /// A required source file does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Encryption failed.
    #[error("encryption failed: {message}")]
    EncryptionFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invalid key length configuration error.
    pub fn invalid_key_length(actual: usize) -> Self {
        Self::configuration(format!(
            "invalid key length: expected 16, 24 or 32 bytes, got {actual}"
        ))
    }

    /// Creates an integrity error.
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
        }
    }

    /// Creates an encryption failed error.
    pub fn encryption_failed(message: impl Into<String>) -> Self {
        Self::EncryptionFailed {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by tag verification or blob decoding.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Self::Io(err.into());
        }
        Self::format(format!("invalid JSON: {err}"))
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return Self::Io(io_err);
            }
            return Self::format("CSV I/O failure");
        }
        Self::format(format!("invalid CSV: {err}"))
    }
}

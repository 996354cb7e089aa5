//! Error types for the codec crate.

use crate::record::RecordField;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while normalizing externally supplied record fields.
///
/// Line parsing itself is infallible; these only surface when a record is
/// built from untrusted input such as an import file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A required field was absent.
    #[error("missing field: {field}")]
    MissingField {
        /// The absent field.
        field: RecordField,
    },

    /// A required field was empty after trimming.
    #[error("empty field: {field}")]
    EmptyField {
        /// The empty field.
        field: RecordField,
    },

    /// A metadata field contained a delimiter or line break.
    #[error("invalid character in field: {field}")]
    InvalidCharacter {
        /// The offending field.
        field: RecordField,
    },
}

impl CodecError {
    /// Create a missing field error.
    pub fn missing_field(field: RecordField) -> Self {
        Self::MissingField { field }
    }

    /// Create an empty field error.
    pub fn empty_field(field: RecordField) -> Self {
        Self::EmptyField { field }
    }

    /// Create an invalid character error.
    pub fn invalid_character(field: RecordField) -> Self {
        Self::InvalidCharacter { field }
    }

    /// Returns the field this error refers to.
    #[must_use]
    pub fn field(&self) -> RecordField {
        match self {
            Self::MissingField { field }
            | Self::EmptyField { field }
            | Self::InvalidCharacter { field } => *field,
        }
    }
}

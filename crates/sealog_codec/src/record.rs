//! The fixed four-field record.

use crate::error::{CodecError, CodecResult};
use crate::line::FIELD_DELIMITER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field names in their canonical order.
///
/// This order is used by the line codec and by every export format.
pub const FIELD_NAMES: [&str; 4] = ["timestamp", "platform", "hardware_id", "message"];

/// One logical log entry.
///
/// Field declaration order matters: it drives the serde field order, which in
/// turn fixes the JSON key order and the CSV header on export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// ISO-8601 timestamp of when the entry was captured.
    pub timestamp: String,
    /// Platform tag of the capturing host (e.g. `linux`).
    pub platform: String,
    /// Caller-supplied hardware identifier.
    pub hardware_id: String,
    /// The entry text. Never contains raw newlines once persisted.
    pub message: String,
}

impl Record {
    /// Creates a record from its four fields, as given.
    pub fn new(
        timestamp: impl Into<String>,
        platform: impl Into<String>,
        hardware_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            platform: platform.into(),
            hardware_id: hardware_id.into(),
            message: message.into(),
        }
    }

    /// Creates the fallback record for a line that did not split into four
    /// fields: empty metadata, the whole line as message.
    pub fn degenerate(line: impl Into<String>) -> Self {
        Self {
            message: line.into(),
            ..Self::default()
        }
    }

    /// Returns true if timestamp, platform and hardware id are all empty.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.timestamp.is_empty() && self.platform.is_empty() && self.hardware_id.is_empty()
    }

    /// Builds a validated record from externally supplied fields.
    ///
    /// `lookup` is asked for each field in canonical order. Every field is
    /// trimmed and the message is sanitized; a missing or empty field is an
    /// error naming that field. Metadata fields must also pass
    /// [`Record::check_metadata`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingField`], [`CodecError::EmptyField`] or
    /// [`CodecError::InvalidCharacter`].
    pub fn normalize<F>(mut lookup: F) -> CodecResult<Self>
    where
        F: FnMut(RecordField) -> Option<String>,
    {
        let mut take = |field: RecordField| -> CodecResult<String> {
            let raw = lookup(field).ok_or(CodecError::missing_field(field))?;
            let value = if field == RecordField::Message {
                sanitize_message(&raw)
            } else {
                raw.trim().to_string()
            };
            if value.is_empty() {
                return Err(CodecError::empty_field(field));
            }
            if field != RecordField::Message && has_forbidden_char(&value) {
                return Err(CodecError::invalid_character(field));
            }
            Ok(value)
        };

        Ok(Self {
            timestamp: take(RecordField::Timestamp)?,
            platform: take(RecordField::Platform)?,
            hardware_id: take(RecordField::HardwareId)?,
            message: take(RecordField::Message)?,
        })
    }

    /// Checks that timestamp, platform and hardware id hold no `|`, `\r` or
    /// `\n`. Any of those would shift the field boundaries of the encoded line.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidCharacter`] naming the first bad field.
    pub fn check_metadata(&self) -> CodecResult<()> {
        for field in [RecordField::Timestamp, RecordField::Platform, RecordField::HardwareId] {
            if has_forbidden_char(self.get(field)) {
                return Err(CodecError::invalid_character(field));
            }
        }
        Ok(())
    }

    /// Returns the value of one field.
    #[must_use]
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Timestamp => &self.timestamp,
            RecordField::Platform => &self.platform,
            RecordField::HardwareId => &self.hardware_id,
            RecordField::Message => &self.message,
        }
    }
}

/// Identifies one of the four record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// `timestamp`
    Timestamp,
    /// `platform`
    Platform,
    /// `hardware_id`
    HardwareId,
    /// `message`
    Message,
}

impl RecordField {
    /// All fields in canonical order.
    pub const ALL: [RecordField; 4] = [
        RecordField::Timestamp,
        RecordField::Platform,
        RecordField::HardwareId,
        RecordField::Message,
    ];

    /// Returns the external name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timestamp => FIELD_NAMES[0],
            Self::Platform => FIELD_NAMES[1],
            Self::HardwareId => FIELD_NAMES[2],
            Self::Message => FIELD_NAMES[3],
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn has_forbidden_char(value: &str) -> bool {
    value.contains([FIELD_DELIMITER, '\r', '\n'])
}

/// Replaces carriage returns and newlines with spaces and trims the result.
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    message.replace(['\r', '\n'], " ").trim().to_string()
}

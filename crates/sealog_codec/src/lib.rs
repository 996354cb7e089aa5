//! # SealLog Codec
//!
//! Record type and plaintext line codec for SealLog.
//!
//! Every record is persisted (before encryption) as a single line:
//!
//! ```text
//! timestamp|platform|hardware_id|message
//! ```
//!
//! ## Codec Rules
//!
//! - The message never contains a raw `\n` or `\r` (they become spaces)
//! - Parsing splits on `|` at most three times, so the message may contain `|`
//! - Parsing never fails: a line without four fields becomes a degenerate
//!   record whose message is the whole line
//!
//! ## Usage
//!
//! ```
//! use sealog_codec::{decode_line, encode_line, Record};
//!
//! let record = Record::new("2026-02-13T00:00:00+00:00", "linux", "abc123", "a|b");
//! let line = encode_line(&record);
//! assert_eq!(line, "2026-02-13T00:00:00+00:00|linux|abc123|a|b");
//! assert_eq!(decode_line(&line), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod line;
mod record;

pub use error::{CodecError, CodecResult};
pub use line::{decode_line, encode_line, FIELD_DELIMITER};
pub use record::{sanitize_message, Record, RecordField, FIELD_NAMES};

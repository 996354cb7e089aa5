//! Delimited line encoding.

use crate::record::{sanitize_message, Record};

/// Separator between record fields in the plaintext line.
pub const FIELD_DELIMITER: char = '|';

/// Serializes a record to its plaintext line (without a line terminator).
///
/// The message is sanitized on the way out; the other fields are written as
/// given.
#[must_use]
pub fn encode_line(record: &Record) -> String {
    let message = sanitize_message(&record.message);
    let mut line = String::with_capacity(
        record.timestamp.len() + record.platform.len() + record.hardware_id.len() + message.len() + 3,
    );
    line.push_str(&record.timestamp);
    line.push(FIELD_DELIMITER);
    line.push_str(&record.platform);
    line.push(FIELD_DELIMITER);
    line.push_str(&record.hardware_id);
    line.push(FIELD_DELIMITER);
    line.push_str(&message);
    line
}

/// Parses a plaintext line back into a record.
///
/// One trailing line terminator (`\n` or `\r\n`) is ignored. The line is split at most three times, so
/// any further delimiters belong to the message. Lines that do not yield four
/// parts become [`Record::degenerate`]; this function never drops input.
#[must_use]
pub fn decode_line(line: &str) -> Record {
    let payload = line
        .strip_suffix('\n')
        .map_or(line, |rest| rest.strip_suffix('\r').unwrap_or(rest));
    let mut parts = payload.splitn(4, FIELD_DELIMITER);

    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(timestamp), Some(platform), Some(hardware_id), Some(message)) => {
            Record::new(timestamp, platform, hardware_id, message)
        }
        _ => Record::degenerate(payload),
    }
}

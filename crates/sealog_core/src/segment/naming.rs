//! Rotated segment file names: `<prefix>_<YYYYMMDD_HHMMSS>.enc`.

use crate::config::SEGMENT_EXTENSION;
use chrono::NaiveDateTime;

/// `chrono` format of the creation stamp embedded in rotated names.
pub const ROTATED_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Builds a rotated name. `attempt` disambiguates rotations that land in the
/// same second: `0` yields the plain name, `n` appends `_n` to the stamp.
pub(crate) fn rotated_name(prefix: &str, stamp: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{prefix}_{stamp}.{SEGMENT_EXTENSION}")
    } else {
        format!("{prefix}_{stamp}_{attempt}.{SEGMENT_EXTENSION}")
    }
}

/// Returns true if `file_name` looks like a rotated segment for `prefix`.
pub(crate) fn is_rotated_name(prefix: &str, file_name: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(SEGMENT_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}

/// Extracts the creation time embedded in a rotated segment name.
///
/// Returns `None` for names that do not carry a valid stamp.
#[must_use]
pub fn rotated_created_at(prefix: &str, file_name: &str) -> Option<NaiveDateTime> {
    if !is_rotated_name(prefix, file_name) {
        return None;
    }
    let start = prefix.len() + 1;
    let stamp = file_name.get(start..start + 15)?;
    NaiveDateTime::parse_from_str(stamp, ROTATED_STAMP_FORMAT).ok()
}

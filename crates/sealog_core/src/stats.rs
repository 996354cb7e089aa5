//! Store statistics.

use serde::Serialize;
use std::path::PathBuf;

/// Size information about the active segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Whether the active segment exists on disk.
    pub exists: bool,
    /// Path of the active segment.
    pub path: PathBuf,
    /// Size of the active segment in bytes.
    pub size: u64,
    /// Number of rotated segments currently on disk.
    pub rotated_segments: usize,
}

impl StoreStats {
    /// Size of the active segment in KiB, rounded to two decimals.
    #[must_use]
    pub fn size_kib(&self) -> f64 {
        (self.size as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

//! Store configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory (under a base directory) holding the segments.
pub const LOG_DIR: &str = "logs";
/// File name of the active segment.
pub const ACTIVE_SEGMENT_FILE: &str = "records.enc";
/// Directory (under a base directory) holding the key file.
pub const CONFIG_DIR: &str = "config";
/// File name of the persisted key.
pub const KEY_FILE: &str = ".key";
/// Extension shared by the active and rotated segments.
pub const SEGMENT_EXTENSION: &str = "enc";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Configuration for opening a segment store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the active segment.
    pub active_path: PathBuf,

    /// Path of the key file.
    pub key_path: PathBuf,

    /// File name prefix of rotated segments. Defaults to the active segment's
    /// file stem when `None`.
    pub rotated_prefix: Option<String>,

    /// Size in bytes past which the active segment is rotated.
    pub max_segment_size: u64,

    /// Whether appends trigger size-based rotation.
    pub rotation: bool,

    /// Age after which rotated segments are removed by cleanup.
    pub retention: Duration,

    /// Whether to fsync the active segment after every append.
    pub sync_on_append: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

impl StoreConfig {
    /// Creates a configuration with the standard layout under `base`:
    /// `logs/records.enc` and `config/.key`.
    #[must_use]
    pub fn in_dir(base: &Path) -> Self {
        Self {
            active_path: base.join(LOG_DIR).join(ACTIVE_SEGMENT_FILE),
            key_path: base.join(CONFIG_DIR).join(KEY_FILE),
            rotated_prefix: None,
            max_segment_size: 10 * 1024 * 1024,                // 10 MB
            rotation: true,
            retention: Duration::from_secs(30 * SECONDS_PER_DAY), // 30 days
            sync_on_append: false,
        }
    }

    /// Sets the active segment path.
    #[must_use]
    pub fn active_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.active_path = path.into();
        self
    }

    /// Sets the key file path.
    #[must_use]
    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = path.into();
        self
    }

    /// Sets the rotated segment prefix.
    #[must_use]
    pub fn rotated_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rotated_prefix = Some(prefix.into());
        self
    }

    /// Sets the rotation threshold.
    #[must_use]
    pub const fn max_segment_size(mut self, size: u64) -> Self {
        self.max_segment_size = size;
        self
    }

    /// Enables or disables size-based rotation.
    #[must_use]
    pub const fn rotation(mut self, value: bool) -> Self {
        self.rotation = value;
        self
    }

    /// Sets the retention window for rotated segments.
    #[must_use]
    pub const fn retention(mut self, window: Duration) -> Self {
        self.retention = window;
        self
    }

    /// Sets the retention window in whole days.
    #[must_use]
    pub const fn retention_days(self, days: u64) -> Self {
        self.retention(Duration::from_secs(days * SECONDS_PER_DAY))
    }

    /// Enables or disables fsync after each append.
    #[must_use]
    pub const fn sync_on_append(mut self, value: bool) -> Self {
        self.sync_on_append = value;
        self
    }

    /// Returns the directory containing every segment.
    #[must_use]
    pub fn segment_dir(&self) -> &Path {
        match self.active_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Returns the effective rotated segment prefix.
    #[must_use]
    pub fn effective_prefix(&self) -> String {
        if let Some(prefix) = &self.rotated_prefix {
            return prefix.clone();
        }
        self.active_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "segment".to_string())
    }
}

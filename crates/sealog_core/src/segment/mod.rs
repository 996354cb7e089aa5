//! Segment storage for encrypted records.
//!
//! A log is one *active* segment (open for appends) plus any number of
//! *rotated* segments (sealed). Every segment is a text file with one
//! encrypted record per line:
//!
//! ```text
//! <db_dir>/logs/
//! ├─ records.enc                    # active segment
//! ├─ records_20260213_101500.enc    # rotated segments
//! └─ records_20260214_093012.enc
//! ```
//!
//! Rotation renames the active segment and starts a new empty one. Cleanup
//! deletes rotated segments older than the retention window. Nothing else
//! ever removes a segment.

mod follow;
mod naming;
mod store;
mod verify;

pub use follow::Follower;
pub use naming::{rotated_created_at, ROTATED_STAMP_FORMAT};
pub use store::{AppendOutcome, SegmentStore};
pub use verify::{SegmentReport, VerifyReport, VerifyTotals};

use std::path::PathBuf;
use std::time::SystemTime;

/// One segment file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Location of the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
    /// Size in bytes.
    pub size: u64,
    /// Whether this is the active segment.
    pub active: bool,
}

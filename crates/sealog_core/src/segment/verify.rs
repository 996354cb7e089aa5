//! Integrity audit results.

use serde::Serialize;
use std::path::PathBuf;

/// Line counts for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentReport {
    /// The audited segment.
    pub path: PathBuf,
    /// Non-blank lines.
    pub lines: usize,
    /// Lines that decrypted successfully.
    pub valid: usize,
    /// Lines that failed decryption.
    pub invalid: usize,
}

impl SegmentReport {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            lines: 0,
            valid: 0,
            invalid: 0,
        }
    }

    pub(crate) fn tally(&mut self, decrypted: bool) {
        self.lines += 1;
        if decrypted {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }

    /// Returns true if every line decrypted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.invalid == 0
    }
}

/// Aggregate counts across all audited segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerifyTotals {
    /// Number of segments audited.
    pub segments: usize,
    /// Non-blank lines.
    pub lines: usize,
    /// Lines that decrypted successfully.
    pub valid: usize,
    /// Lines that failed decryption.
    pub invalid: usize,
}

/// Result of [`SegmentStore::verify`](crate::SegmentStore::verify).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Totals over every segment.
    pub total: VerifyTotals,
    /// Per-segment counts, in audit order.
    pub segments: Vec<SegmentReport>,
}

impl VerifyReport {
    pub(crate) fn push(&mut self, report: SegmentReport) {
        self.total.segments += 1;
        self.total.lines += report.lines;
        self.total.valid += report.valid;
        self.total.invalid += report.invalid;
        self.segments.push(report);
    }

    /// Returns true if no line failed decryption.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.total.invalid == 0
    }
}

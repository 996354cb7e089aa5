//! List command implementation.

use super::{open_store, CommandResult};
use sealog_core::{Segment, StoreConfig};
use serde::Serialize;
use std::time::UNIX_EPOCH;

/// One listed segment.
#[derive(Debug, Serialize)]
pub struct SegmentEntry {
    /// Segment path.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub modified: u64,
    /// Whether this is the active segment.
    pub active: bool,
}

impl From<&Segment> for SegmentEntry {
    fn from(segment: &Segment) -> Self {
        Self {
            path: segment.path.display().to_string(),
            size: segment.size,
            modified: segment
                .modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            active: segment.active,
        }
    }
}

/// Runs the list command.
pub fn run(config: StoreConfig, format: &str) -> CommandResult {
    let store = open_store(config)?;
    let entries: Vec<SegmentEntry> = store
        .list_segments(true)?
        .iter()
        .map(SegmentEntry::from)
        .collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
        _ => {
            for entry in &entries {
                let marker = if entry.active { "*" } else { " " };
                println!("{marker} {:>12}  {}", entry.size, entry.path);
            }
            println!();
            println!("{} segment(s), * = active", entries.len());
        }
    }
    Ok(())
}

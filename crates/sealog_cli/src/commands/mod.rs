//! CLI command implementations.

pub mod append;
pub mod exchange;
pub mod key_info;
pub mod list;
pub mod maintenance;
pub mod read;
pub mod stats;
pub mod tail;
pub mod verify;

use sealog_core::{Record, SegmentStore, StoreConfig};

/// Result type shared by every command.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Opens (and initializes) the store described by `config`.
pub fn open_store(config: StoreConfig) -> CommandResult<SegmentStore> {
    let store = SegmentStore::open(config)?;
    store.initialize()?;
    Ok(store)
}

/// Formats one record for text output.
pub fn format_record(record: &Record) -> String {
    if record.is_degenerate() {
        return record.message.clone();
    }
    format!(
        "{} [{}] {}: {}",
        record.timestamp, record.platform, record.hardware_id, record.message
    )
}

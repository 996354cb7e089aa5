//! Tail command implementation.

use super::{format_record, open_store, CommandResult};
use sealog_core::{Follower, RecordFilter, StoreConfig};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Runs the tail command. Loops until the process is interrupted.
pub fn run(config: StoreConfig, from_start: bool, redact: bool, interval_ms: u64) -> CommandResult {
    let store = open_store(config)?;
    let filter = RecordFilter::new().redact_hardware(redact);
    let mut follower = Follower::new(&store, from_start)?;
    let interval = Duration::from_millis(interval_ms.max(1));
    debug!(path = %store.active_path().display(), ?interval, "following active segment");

    loop {
        for record in filter.apply(follower.poll(&store)?) {
            println!("{}", format_record(&record));
        }
        thread::sleep(interval);
    }
}

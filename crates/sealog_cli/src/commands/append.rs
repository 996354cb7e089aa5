//! Append command implementation.

use super::{open_store, CommandResult};
use sealog_core::{SegmentStore, StoreConfig};
use std::io::{self, BufRead};

/// Runs the append command.
///
/// Without a message, every line of stdin becomes one record.
pub fn run(config: StoreConfig, message: Option<&str>, hardware_id: &str) -> CommandResult {
    let store = open_store(config)?;

    match message {
        Some(message) => match store.append_message(message, hardware_id)? {
            Some(record) => println!("Recorded entry at {}", record.timestamp),
            None => println!("Nothing recorded: message is blank"),
        },
        None => {
            let recorded = append_lines(&store, io::stdin().lock(), hardware_id)?;
            println!("Recorded {recorded} entries");
        }
    }
    Ok(())
}

/// Appends one record per non-blank line of `reader`.
pub fn append_lines<R: BufRead>(
    store: &SegmentStore,
    reader: R,
    hardware_id: &str,
) -> CommandResult<usize> {
    let mut recorded = 0;
    for line in reader.lines() {
        if store.append_message(&line?, hardware_id)?.is_some() {
            recorded += 1;
        }
    }
    Ok(recorded)
}

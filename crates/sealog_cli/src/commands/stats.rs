//! Stats command implementation.

use super::{open_store, CommandResult};
use sealog_core::{StoreConfig, StoreStats};

/// Runs the stats command.
pub fn run(config: StoreConfig, format: &str) -> CommandResult {
    let store = open_store(config)?;
    let stats = store.stats()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&stats)?),
        _ => print_text_output(&stats),
    }
    Ok(())
}

fn print_text_output(stats: &StoreStats) {
    println!("SealLog Store Statistics");
    println!("========================");
    println!("Active segment:   {}", stats.path.display());
    if stats.exists {
        println!("Size:             {} bytes ({} KiB)", stats.size, stats.size_kib());
    } else {
        println!("Size:             (missing)");
    }
    println!("Rotated segments: {}", stats.rotated_segments);
}

//! Rotate, cleanup and clear commands.

use super::{open_store, CommandResult};
use sealog_core::StoreConfig;

/// Seals the active segment.
pub fn rotate(config: StoreConfig) -> CommandResult {
    let store = open_store(config)?;
    let rotated = store.rotate()?;
    println!("Rotated active segment to {}", rotated.display());
    Ok(())
}

/// Deletes expired rotated segments.
pub fn cleanup(config: StoreConfig) -> CommandResult {
    let store = open_store(config)?;
    let removed = store.cleanup()?;
    println!("Removed {removed} expired segment(s)");
    Ok(())
}

/// Truncates the active segment. The caller has already confirmed.
pub fn clear(config: StoreConfig) -> CommandResult {
    let store = open_store(config)?;
    store.clear_active()?;
    println!("Cleared {}", store.active_path().display());
    Ok(())
}

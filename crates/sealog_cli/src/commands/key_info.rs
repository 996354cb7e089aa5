//! Key info command implementation.

use super::CommandResult;
use sealog_core::{KeyManager, StoreConfig};

/// Prints the key location, size and fingerprint. Creates the key if missing.
pub fn run(config: StoreConfig) -> CommandResult {
    let key = KeyManager::load_or_create(&config.key_path)?;
    println!("Key file:    {}", config.key_path.display());
    println!("Key size:    {} bits", key.len() * 8);
    println!("Fingerprint: {}", KeyManager::fingerprint(&key));
    Ok(())
}

//! Export and import commands.

use super::{open_store, CommandResult};
use sealog_core::{Exchange, ExchangeFormat, StoreConfig};
use std::path::Path;

/// Writes records to `output`.
pub fn export(
    config: StoreConfig,
    format: ExchangeFormat,
    output: &Path,
    limit: Option<usize>,
) -> CommandResult {
    let store = open_store(config)?;
    let written = Exchange::new(&store).export(format, output, limit)?;
    println!("Exported {written} record(s) to {} ({format})", output.display());
    Ok(())
}

/// Appends records from `input`.
pub fn import(
    config: StoreConfig,
    format: ExchangeFormat,
    input: &Path,
    limit: Option<usize>,
) -> CommandResult {
    let store = open_store(config)?;
    let summary = Exchange::new(&store).import(format, input, limit)?;
    println!(
        "Imported {} record(s), rejected {} from {}",
        summary.accepted,
        summary.rejected,
        input.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;

    #[test]
    fn csv_roundtrip_between_stores() {
        let (dir, config) = test_support::config();
        let store = open_store(config.clone()).unwrap();
        store.append_message("quoted \"text\", with comma", "hw").unwrap();

        let file = dir.path().join("out/records.csv");
        export(config, ExchangeFormat::Csv, &file, None).unwrap();

        let (_other, target) = test_support::config();
        import(target.clone(), ExchangeFormat::Csv, &file, Some(0)).unwrap();
        let records = open_store(target).unwrap().read_active().unwrap();
        assert_eq!(records[0].message, "quoted \"text\", with comma");
    }

    #[test]
    fn missing_import_source_fails() {
        let (dir, config) = test_support::config();
        let missing = dir.path().join("nope.json");
        assert!(import(config, ExchangeFormat::Json, &missing, None).is_err());
    }
}

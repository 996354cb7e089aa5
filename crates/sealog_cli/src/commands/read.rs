//! Read command implementation.

use super::{format_record, open_store, CommandResult};
use sealog_core::{keep_last, Record, RecordFilter, SegmentStore, StoreConfig};

/// Selection options for the read command.
#[derive(Debug, Default)]
pub struct ReadOptions {
    /// Keep only the last N matching records.
    pub limit: Option<usize>,
    /// Case-insensitive message substring.
    pub query: Option<String>,
    /// Inclusive lower timestamp bound.
    pub since: Option<String>,
    /// Inclusive upper timestamp bound.
    pub until: Option<String>,
    /// Replace hardware identifiers.
    pub redact: bool,
    /// Skip rotated segments.
    pub active_only: bool,
}

impl ReadOptions {
    fn filter(&self) -> CommandResult<RecordFilter> {
        let mut filter = RecordFilter::new().redact_hardware(self.redact);
        if let Some(query) = &self.query {
            filter = filter.query(query.as_str());
        }
        if let Some(since) = &self.since {
            filter = filter.since(since)?;
        }
        if let Some(until) = &self.until {
            filter = filter.until(until)?;
        }
        Ok(filter)
    }
}

/// Runs the read command.
pub fn run(config: StoreConfig, options: &ReadOptions, format: &str) -> CommandResult {
    let store = open_store(config)?;
    let records = select(&store, options)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            for record in &records {
                println!("{}", format_record(record));
            }
            if records.is_empty() {
                println!("No records found");
            }
        }
    }
    Ok(())
}

/// Reads the log and applies the filter and limit.
pub fn select(store: &SegmentStore, options: &ReadOptions) -> CommandResult<Vec<Record>> {
    let filter = options.filter()?;
    let records = store.read_log(!options.active_only)?;
    Ok(keep_last(filter.apply(records), options.limit))
}

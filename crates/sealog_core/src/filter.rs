//! Post-read record selection and redaction.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sealog_codec::Record;

/// Replacement written over redacted hardware identifiers.
pub const REDACTED: &str = "REDACTED";

/// Selects and redacts records after they have been read.
///
/// Bounds are inclusive. When a bound is set, records with an empty or
/// unparseable timestamp never match.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    query: Option<String>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    redact_hardware: bool,
}

impl RecordFilter {
    /// Creates a filter that keeps everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps records whose message contains `query`, ignoring case.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then(|| query.to_lowercase());
        self
    }

    /// Keeps records at or after `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns a format error if `timestamp` cannot be parsed.
    pub fn since(mut self, timestamp: &str) -> CoreResult<Self> {
        self.since = Some(parse_bound(timestamp)?);
        Ok(self)
    }

    /// Keeps records at or before `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns a format error if `timestamp` cannot be parsed.
    pub fn until(mut self, timestamp: &str) -> CoreResult<Self> {
        self.until = Some(parse_bound(timestamp)?);
        Ok(self)
    }

    /// Replaces hardware identifiers with [`REDACTED`].
    #[must_use]
    pub const fn redact_hardware(mut self, value: bool) -> Self {
        self.redact_hardware = value;
        self
    }

    /// Returns true if `record` passes every selection criterion.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(query) = &self.query {
            if !record.message.to_lowercase().contains(query) {
                return false;
            }
        }
        if self.since.is_none() && self.until.is_none() {
            return true;
        }
        let Some(at) = parse_timestamp(&record.timestamp) else {
            return false;
        };
        self.since.map_or(true, |since| at >= since) && self.until.map_or(true, |until| at <= until)
    }

    /// Keeps matching records, in order, and applies redaction.
    #[must_use]
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .map(|mut record| {
                if self.redact_hardware {
                    record.hardware_id = REDACTED.to_string();
                }
                record
            })
            .collect()
    }
}

/// Parses a stored or user-supplied timestamp.
///
/// Accepts RFC 3339 (with `Z` or an offset), a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// taken as UTC, or a bare `YYYY-MM-DD` meaning midnight UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_bound(value: &str) -> CoreResult<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| CoreError::format(format!("invalid timestamp: {value:?}")))
}

/// Keeps the last `limit` items. `None` or `Some(0)` keeps everything.
#[must_use]
pub fn keep_last<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) if limit > 0 && items.len() > limit => items.split_off(items.len() - limit),
        _ => items,
    }
}

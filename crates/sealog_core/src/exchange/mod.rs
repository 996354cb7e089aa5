//! Bulk export and import of records.
//!
//! Two external formats are supported:
//!
//! - **JSON**: a pretty-printed array of objects with the keys `timestamp`,
//!   `platform`, `hardware_id` and `message`.
//! - **CSV**: RFC 4180 with the header `timestamp,platform,hardware_id,message`.
//!   On import, columns are matched by header name so their order does not
//!   matter.
//!
//! Imported entries go through [`Record::normalize`] and are then appended
//! through the regular store path, so they are encrypted and may trigger
//! rotation like any other append. Invalid entries are counted, not fatal.

mod delimited;
mod json;

use crate::error::{CoreError, CoreResult};
use crate::filter::keep_last;
use crate::segment::SegmentStore;
use sealog_codec::{CodecError, Record, RecordField};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// External representation used by export and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFormat {
    /// JSON array of objects.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl ExchangeFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for ExchangeFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(CoreError::format(format!(
                "unknown format {other:?}, expected json or csv"
            ))),
        }
    }
}

impl fmt::Display for ExchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}

/// Counts reported by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Entries appended to the store.
    pub accepted: usize,
    /// Entries skipped because they were invalid.
    pub rejected: usize,
}

/// Why one imported entry was skipped.
#[derive(Debug, Error)]
pub(crate) enum RejectReason {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("field {field} must be a string, number or boolean")]
    UnsupportedValue { field: RecordField },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// One parsed import entry, valid or not.
pub(crate) type Candidate = Result<Record, RejectReason>;

/// Export and import on top of a [`SegmentStore`].
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    store: &'a SegmentStore,
}

impl<'a> Exchange<'a> {
    /// Creates an exchange bound to `store`.
    #[must_use]
    pub fn new(store: &'a SegmentStore) -> Self {
        Self { store }
    }

    /// Writes the log to `destination`, creating parent directories.
    ///
    /// Records from rotated segments come first, oldest first, followed by the
    /// active segment. With a `limit` only the last `limit` records are
    /// written; `None` or `Some(0)` writes everything. Returns the number of
    /// records written.
    pub fn export(
        &self,
        format: ExchangeFormat,
        destination: &Path,
        limit: Option<usize>,
    ) -> CoreResult<usize> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(File::create(destination)?);
        let written = self.export_to(format, file, limit)?;
        info!(%format, written, destination = %destination.display(), "exported records");
        Ok(written)
    }

    /// Writes the log to an arbitrary writer. See [`export`](Self::export).
    pub fn export_to<W: Write>(
        &self,
        format: ExchangeFormat,
        mut writer: W,
        limit: Option<usize>,
    ) -> CoreResult<usize> {
        let records = keep_last(self.store.read_log(true)?, limit);
        match format {
            ExchangeFormat::Json => json::write(&mut writer, &records)?,
            ExchangeFormat::Csv => delimited::write(&mut writer, &records)?,
        }
        writer.flush()?;
        Ok(records.len())
    }

    /// Appends the entries of `source` to the store.
    ///
    /// Only the first `limit` entries are considered; `None` or `Some(0)`
    /// considers all of them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `source` does not exist and
    /// [`CoreError::Format`] if the payload as a whole is malformed. Invalid
    /// individual entries are only counted.
    pub fn import(
        &self,
        format: ExchangeFormat,
        source: &Path,
        limit: Option<usize>,
    ) -> CoreResult<ImportSummary> {
        let file = match File::open(source) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::not_found(source));
            }
            Err(err) => return Err(err.into()),
        };
        let summary = self.import_from(format, BufReader::new(file), limit)?;
        info!(
            %format,
            accepted = summary.accepted,
            rejected = summary.rejected,
            source = %source.display(),
            "imported records"
        );
        Ok(summary)
    }

    /// Appends entries read from an arbitrary reader. See
    /// [`import`](Self::import).
    pub fn import_from<R: Read>(
        &self,
        format: ExchangeFormat,
        reader: R,
        limit: Option<usize>,
    ) -> CoreResult<ImportSummary> {
        let candidates = match format {
            ExchangeFormat::Json => json::read(reader)?,
            ExchangeFormat::Csv => delimited::read(reader)?,
        };

        self.store.initialize()?;
        let mut summary = ImportSummary::default();
        for (index, candidate) in take_first(candidates, limit).into_iter().enumerate() {
            match candidate {
                Ok(record) => {
                    self.store.append(&record)?;
                    summary.accepted += 1;
                }
                Err(reason) => {
                    debug!(entry = index, %reason, "rejected import entry");
                    summary.rejected += 1;
                }
            }
        }
        Ok(summary)
    }
}

fn take_first<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit.filter(|&limit| limit > 0) {
        items.truncate(limit);
    }
    items
}

//! CSV exchange format.

use super::{Candidate, RejectReason};
use crate::error::CoreResult;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use sealog_codec::{Record, RecordField, FIELD_NAMES};
use std::io::{Read, Write};

pub(crate) fn write<W: Write>(writer: W, records: &[Record]) -> CoreResult<()> {
    // Header written by hand so an empty export still has one.
    let mut out = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(writer);
    out.write_record(FIELD_NAMES)?;
    for record in records {
        out.write_record(RecordField::ALL.map(|field| record.get(field)))?;
    }
    out.flush()?;
    Ok(())
}

pub(crate) fn read<R: Read>(reader: R) -> CoreResult<Vec<Candidate>> {
    let mut rows = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(rows.headers()?);

    let mut candidates = Vec::new();
    for row in rows.records() {
        let candidate = match row {
            Ok(row) => Record::normalize(|field| columns.value(&row, field)).map_err(Into::into),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => Err(RejectReason::Unreadable(err.to_string())),
        };
        candidates.push(candidate);
    }
    Ok(candidates)
}

/// Column index of each field, by header name.
struct Columns([Option<usize>; 4]);

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        Self(RecordField::ALL.map(|field| {
            headers
                .iter()
                .position(|name| name.trim_start_matches('\u{feff}').trim() == field.name())
        }))
    }

    fn value(&self, row: &StringRecord, field: RecordField) -> Option<String> {
        let slot = RecordField::ALL.iter().position(|f| *f == field)?;
        self.0[slot].and_then(|index| row.get(index)).map(str::to_string)
    }
}

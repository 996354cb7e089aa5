//! JSON exchange format.

use super::{Candidate, RejectReason};
use crate::error::{CoreError, CoreResult};
use sealog_codec::{Record, RecordField};
use serde_json::{Map, Value};
use std::io::{Read, Write};

pub(crate) fn write<W: Write>(mut writer: W, records: &[Record]) -> CoreResult<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub(crate) fn read<R: Read>(reader: R) -> CoreResult<Vec<Candidate>> {
    let root: Value = serde_json::from_reader(reader)?;
    let Value::Array(entries) = root else {
        return Err(CoreError::format("JSON import root must be an array"));
    };
    Ok(entries.into_iter().map(candidate).collect())
}

fn candidate(entry: Value) -> Candidate {
    let Value::Object(fields) = entry else {
        return Err(RejectReason::NotAnObject);
    };
    for field in RecordField::ALL {
        if fields.get(field.name()).is_some_and(|value| scalar(value).is_none()) {
            return Err(RejectReason::UnsupportedValue { field });
        }
    }
    Ok(Record::normalize(|field| lookup(&fields, field))?)
}

fn lookup(fields: &Map<String, Value>, field: RecordField) -> Option<String> {
    fields.get(field.name()).and_then(scalar)
}

/// Strings pass through; numbers and booleans are stringified.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

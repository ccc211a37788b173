//! Typed entity contract layered over dynamic records.

use crate::error::{DataError, DataResult};
use crate::model::descriptor::TableDescriptor;
use crate::model::record::Record;
use crate::model::value::Value;

/// A Rust type persisted as one row of a fixed table.
pub trait Entity: Sized {
    /// Descriptor of the backing table.
    fn descriptor() -> &'static TableDescriptor;
    /// Column values to write. Omit an unset auto-increment key.
    fn to_record(&self) -> Record;
    /// Rebuilds the entity from a full row.
    fn from_record(record: &Record) -> DataResult<Self>;
}

pub(crate) fn required_i64(record: &Record, column: &str) -> DataResult<i64> {
    record
        .get(column)
        .and_then(Value::as_integer)
        .ok_or_else(|| missing(column, "integer"))
}

pub(crate) fn optional_i64(record: &Record, column: &str) -> DataResult<Option<i64>> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(value)) => Ok(Some(*value)),
        Some(_) => Err(missing(column, "integer")),
    }
}

pub(crate) fn optional_f64(record: &Record, column: &str) -> DataResult<Option<f64>> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_real()
            .map(Some)
            .ok_or_else(|| missing(column, "real")),
    }
}

pub(crate) fn required_text(record: &Record, column: &str) -> DataResult<String> {
    record
        .get(column)
        .and_then(Value::as_text)
        .map(str::to_string)
        .ok_or_else(|| missing(column, "text"))
}

pub(crate) fn optional_text(record: &Record, column: &str) -> DataResult<Option<String>> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_text()
            .map(|text| Some(text.to_string()))
            .ok_or_else(|| missing(column, "text")),
    }
}

fn missing(column: &str, expected: &str) -> DataError {
    DataError::InvalidRecord(format!("column `{column}` must hold {expected}"))
}

//! JSON encoding of value lists and row batches.
//!
//! These are the encodings SQLite expands with `json_each(...)`: a value list
//! becomes a JSON array of scalars, and a row batch becomes a JSON array of
//! objects keyed by the unescaped column name so `json_extract(value, '$.col')`
//! can pull each field back out.

use crate::error::{BatchError, BatchResult};
use crate::value::Value;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Encode a value list as a JSON array.
pub fn encode_values(values: &[Value]) -> BatchResult<String> {
    Ok(serde_json::to_string(values)?)
}

/// Encode a batch of positional rows as a JSON array of objects.
///
/// Every row must have exactly `columns.len()` values.
pub fn encode_rows(columns: &[String], rows: &[Vec<Value>]) -> BatchResult<String> {
    if let Some((idx, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(BatchError::validation(format!(
            "row {idx} has {} values but {} columns were declared",
            row.len(),
            columns.len()
        )));
    }
    Ok(serde_json::to_string(&RowBatch { columns, rows })?)
}

/// Decode a JSON array of scalars.
pub fn decode_values(text: &str) -> BatchResult<Vec<Value>> {
    let parsed: Vec<serde_json::Value> = serde_json::from_str(text)?;
    parsed.into_iter().map(value_from_json).collect()
}

/// Decode a JSON array of objects into name-keyed rows.
pub fn decode_rows(text: &str) -> BatchResult<Vec<BTreeMap<String, Value>>> {
    let parsed: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)?;
    parsed
        .into_iter()
        .map(|obj| {
            obj.into_iter()
                .map(|(k, v)| Ok((k, value_from_json(v)?)))
                .collect()
        })
        .collect()
}

/// Convert a decoded JSON scalar into a [`Value`].
///
/// Booleans map to 0/1 the way SQLite's `json_extract` reports them.
pub fn value_from_json(value: serde_json::Value) -> BatchResult<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Real(f))
            } else {
                Err(BatchError::serialization(format!(
                    "number {n} is out of range for a 64-bit value"
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        other => Err(BatchError::serialization(format!(
            "expected a scalar, got {other}"
        ))),
    }
}

struct RowBatch<'a> {
    columns: &'a [String],
    rows: &'a [Vec<Value>],
}

struct RowObject<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl Serialize for RowBatch<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in self.rows {
            seq.serialize_element(&RowObject {
                columns: self.columns,
                values,
            })?;
        }
        seq.end()
    }
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

//! JSON document reader.
//!
//! Accepted shapes, checked in order:
//!
//! - a top-level array of objects;
//! - a top-level object with an array-valued member (the first one in
//!   document order is used);
//! - any other top-level object, read as a single row.

use brg_core::{CellValue, RawTable};
use serde_json::Value;

use crate::keyed::KeyedRows;

/// Why a document could not be turned into rows.
#[derive(Debug)]
pub(crate) enum JsonShapeError {
    Syntax(serde_json::Error),
    Unsupported(&'static str),
}

pub(crate) fn read_json(bytes: &[u8]) -> Result<RawTable, JsonShapeError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let document: Value = serde_json::from_slice(bytes).map_err(JsonShapeError::Syntax)?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            let array_key = object
                .iter()
                .find(|(_, value)| value.is_array())
                .map(|(key, _)| key.clone());
            match array_key.and_then(|key| object.remove(&key)) {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(object)],
            }
        }
        other => return Err(JsonShapeError::Unsupported(type_name(&other))),
    };

    let mut rows = KeyedRows::new();
    for item in items {
        if let Value::Object(object) = item {
            rows.push(object.into_iter().map(|(key, value)| (key, cell_value(value))));
        }
    }
    Ok(rows.into_table())
}

fn cell_value(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
        Value::String(s) => CellValue::from_text(s),
        Value::Bool(b) => CellValue::Text(b.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => CellValue::Text(nested.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Encoding of a section's key/value map as a `data.json` document.
//!
//! The document is a JSON object mapping each key to
//! `{"Value": <payload>, "Type": <tag>}`. Integers, floats, strings and
//! booleans use their natural JSON form; byte sequences are a lowercase hex
//! string without separators. Numbers are read back through serde_json's
//! integer paths, never through `f64`, so 64-bit integers round-trip exactly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::value::Value as JsonValue;

use sectionfs_core_store::{Error, Value, ValueType};

/// Name of the per-directory data document.
pub const DATA_FILE: &str = "data.json";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct StoredValue {
    #[serde(rename = "Value")]
    value: JsonValue,
    #[serde(rename = "Type")]
    value_type: ValueType,
}

/// Serialize `entries` into the bytes of a data document.
///
/// Keys are written in sorted order with two-space indentation. `path` only
/// labels errors.
pub fn encode_document<I>(entries: I, path: &Path) -> Result<Vec<u8>, Error>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut document = BTreeMap::new();
    for (key, value) in entries {
        let stored = StoredValue {
            value_type: value.value_type(),
            value: encode_value(value)
                .map_err(|message| Error::encode(path, format!("key {:?}: {}", key, message)))?,
        };
        document.insert(key, stored);
    }

    let mut bytes =
        serde_json::to_vec_pretty(&document).map_err(|e| Error::encode(path, e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse the bytes of a data document back into key/value pairs.
///
/// Any malformed entry fails the whole document. `path` only labels errors.
pub fn decode_document(bytes: &[u8], path: &Path) -> Result<Vec<(String, Value)>, Error> {
    let document: BTreeMap<String, StoredValue> =
        serde_json::from_slice(bytes).map_err(|e| Error::decode(path, e.to_string()))?;

    document
        .into_iter()
        .map(|(key, stored)| {
            decode_value(stored)
                .map(|value| (key.clone(), value))
                .map_err(|message| Error::decode(path, format!("key {:?}: {}", key, message)))
        })
        .collect()
}

fn encode_value(value: Value) -> Result<JsonValue, String> {
    Ok(match value {
        Value::Int(i) => JsonValue::from(i),
        Value::UInt(u) => JsonValue::from(u),
        Value::String(s) => JsonValue::String(s),
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("float {} has no JSON representation", f))?,
        Value::Bytes(b) => JsonValue::String(hex::encode(b)),
    })
}

fn decode_value(stored: StoredValue) -> Result<Value, String> {
    let StoredValue { value, value_type } = stored;
    let mismatch = || format!("payload {} does not match type {}", value, value_type);

    match value_type {
        ValueType::Int => value.as_i64().map(Value::Int).ok_or_else(mismatch),
        ValueType::UInt => value.as_u64().map(Value::UInt).ok_or_else(mismatch),
        ValueType::Float => value.as_f64().map(Value::Float).ok_or_else(mismatch),
        ValueType::Bool => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
        ValueType::String => match &value {
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            _ => Err(mismatch()),
        },
        ValueType::Bytes => match &value {
            JsonValue::String(s) => hex::decode(s)
                .map(Value::Bytes)
                .map_err(|e| format!("invalid hex byte sequence {:?}: {}", s, e)),
            _ => Err(mismatch()),
        },
        ValueType::None => Err("values of type none are never persisted".to_string()),
    }
}

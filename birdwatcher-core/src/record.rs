//! Total accessors over loosely-typed wire records.
//!
//! The birdwatcher JSON output is schema-less from the client's point of view:
//! fields go missing between tool versions, 64-bit ids are rendered either as
//! numbers or as strings, and key/value parameter lists arrive as arrays of
//! `{key, value}` objects. Every accessor here falls back to the field's
//! default instead of failing.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One decoded JSON object as printed by the tool.
pub type WireRecord = Map<String, Value>;

/// Run `map` over every element of a decoded listing, preserving its order.
///
/// A lone object is treated as a one-row listing. Elements that are not
/// objects map through an empty record, so they still yield a fully-defaulted
/// entity. Anything else is an empty listing.
pub fn map_records<T>(value: &Value, map: impl Fn(&WireRecord) -> T) -> Vec<T> {
    match value {
        Value::Array(items) => items.iter().map(|item| map_one(item, &map)).collect(),
        Value::Object(record) => vec![map(record)],
        _ => Vec::new(),
    }
}

fn map_one<T>(item: &Value, map: &impl Fn(&WireRecord) -> T) -> T {
    match item {
        Value::Object(record) => map(record),
        _ => map(&WireRecord::new()),
    }
}

/// Signed integer field; numeric strings are accepted.
pub fn get_i64(record: &WireRecord, key: &str) -> i64 {
    record.get(key).and_then(value_as_i64).unwrap_or(0)
}

/// Unsigned integer field; numeric strings are accepted, negatives clamp to zero.
pub fn get_u64(record: &WireRecord, key: &str) -> u64 {
    match record.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// String field; numbers and booleans are rendered with their JSON spelling.
pub fn get_str(record: &WireRecord, key: &str) -> String {
    record.get(key).map(value_as_string).unwrap_or_default()
}

/// Boolean field; `"true"`/`"false"` strings are accepted.
pub fn get_bool(record: &WireRecord, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Nested object field, or an empty record.
pub fn get_object<'a>(record: &'a WireRecord, key: &str) -> Option<&'a WireRecord> {
    record.get(key).and_then(Value::as_object)
}

/// Raw value lookup, used for fields whose wire type varies (e.g. data types).
pub fn get_value<'a>(record: &'a WireRecord, key: &str) -> Option<&'a Value> {
    record.get(key)
}

/// List of integer ids. Items that do not parse are skipped.
pub fn get_i64_list(record: &WireRecord, key: &str) -> Vec<i64> {
    match record.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(value_as_i64).collect(),
        _ => Vec::new(),
    }
}

/// List of strings. Non-string scalars are rendered, nulls skipped.
pub fn get_str_list(record: &WireRecord, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(value_as_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Length of an array field, zero when missing or not an array.
pub fn get_len(record: &WireRecord, key: &str) -> usize {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

/// Fold a `[{key, value}, ...]` parameter list into a map.
///
/// Items without a `key` are skipped; a missing `value` becomes an empty
/// string. A later duplicate key overwrites an earlier one.
pub fn get_kv_map(record: &WireRecord, key: &str) -> BTreeMap<String, String> {
    let Some(Value::Array(items)) = record.get(key) else {
        return BTreeMap::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|pair| {
            let k = pair.get("key").map(value_as_string)?;
            let v = pair.get("value").map(value_as_string).unwrap_or_default();
            Some((k, v))
        })
        .collect()
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

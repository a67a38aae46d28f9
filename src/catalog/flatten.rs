//! Dotted-path flattening of nested JSON objects.

use serde_json::{Map, Value};

/// Flatten nested objects into dotted keys.
///
/// `{"a": {"b": 1}, "c": [{"d": 2}]}` becomes `{"a.b": 1, "c": [{"d": 2}]}`.
/// Arrays are kept as-is and never recursed into. Empty nested objects
/// contribute no keys. A non-object `value` is stored under `prefix`, or
/// dropped when `prefix` is empty.
pub fn flatten(value: &Value, prefix: &str) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(value, prefix, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match child {
                    Value::Object(_) => flatten_into(child, &path, out),
                    other => {
                        out.insert(path, other.clone());
                    }
                }
            }
        }
        other if !prefix.is_empty() => {
            out.insert(prefix.to_string(), other.clone());
        }
        _ => {}
    }
}

/// Drop every `@` from a column name (`publisher.@type` -> `publisher.type`).
pub fn strip_at(column: &str) -> String {
    column.replace('@', "")
}

/// Flatten the first element of a `distribution` array into
/// `distribution_`-prefixed columns.
pub fn flatten_first_distribution(dataset: &Value) -> Map<String, Value> {
    dataset
        .get("distribution")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .map(|first| {
            flatten(first, "")
                .into_iter()
                .map(|(key, value)| (format!("distribution_{}", strip_at(&key)), value))
                .collect()
        })
        .unwrap_or_default()
}

//! Named conversions for loosely-typed catalog values.

use serde_json::{Map, Value};

/// Coerce a facet or flag cell to a boolean. Missing or null is `false`.
///
/// Strings count as true only for "true" or "1" (any case); numbers when
/// non-zero. Anything else is false.
pub fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}

/// Coerce a vintage cell to its string form.
///
/// Numeric vintages become their integer string (`2020.0` -> `"2020"`).
/// Missing, null and blank vintages are `None`, never a sentinel.
pub fn coerce_vintage(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| (f.trunc() as i64).to_string())
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if let Ok(i) = s.parse::<i64>() {
                Some(i.to_string())
            } else if let Some(f) = s.parse::<f64>().ok().filter(|f| f.is_finite()) {
                Some((f.trunc() as i64).to_string())
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

/// Coerce a variable's allowed-values cell to a mapping. Missing is empty.
pub fn coerce_value_codes(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Render a scalar cell as text. Null, arrays and objects are `None`.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce a list-of-labels cell to strings. A bare scalar is a one-item list.
pub fn coerce_labels(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(label_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![label_text(other)],
    }
}

/// Text form of a single label value.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Shared helper functions for CLI commands.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render an optional text cell, dimming missing values.
pub fn cell(value: Option<&str>, max_len: usize) -> String {
    match value {
        Some(text) => truncate(text, max_len),
        None => style("-").dim().to_string(),
    }
}

/// Apply a `--limit` value where 0 means everything.
pub fn limited<T>(rows: &[T], limit: usize) -> &[T] {
    if limit == 0 || limit >= rows.len() {
        rows
    } else {
        &rows[..limit]
    }
}

/// Print each record as one line of JSON.
pub fn print_json_lines<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

/// Spinner on stderr while a request is in flight.
pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// One-line description of a detail document's size.
pub fn summarize(json: &Value) -> String {
    match json {
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(key, value)| match value {
                    Value::Object(inner) => format!("{} {}", inner.len(), key),
                    Value::Array(items) => format!("{} {}", items.len(), key),
                    _ => key.clone(),
                })
                .collect();
            parts.join(", ")
        }
        Value::Array(items) => format!("{} rows", items.len()),
        other => truncate(&other.to_string(), 40),
    }
}

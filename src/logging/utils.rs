//! Text helpers shared by the console and file sinks.
use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement, erase, etc.
/// are also stripped without consuming unrelated text.
pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Format `ts` as `YYYY-MM-DDTHH:MM:SS.ffffffZ` (microsecond precision).
pub(super) fn format_timestamp_us(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Format `ts` as `HH:MM:SS`.
pub(super) fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Render attributes as ` key=value` pairs in key order.
///
/// Strings are written bare unless they contain whitespace, `=` or quotes,
/// in which case they are JSON-quoted; other values use their JSON form.
pub(super) fn format_attrs(attrs: &BTreeMap<String, Value>) -> String {
    let mut out = String::new();
    for (key, value) in attrs {
        let _ = match value {
            Value::String(s) if needs_quoting(s) => write!(out, " {key}={value}"),
            Value::String(s) => write!(out, " {key}={s}"),
            other => write!(out, " {key}={other}"),
        };
    }
    out
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
}

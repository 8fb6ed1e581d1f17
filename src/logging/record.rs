//! Structured log records as produced by call sites.
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::level::Level;

/// One key/value attribute attached to a record or a scoped logger.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    /// Attribute name, before any group prefix is applied.
    pub key: String,
    /// Dynamically typed value.
    pub value: Value,
}

impl Attr {
    /// Build an attribute from anything convertible to a JSON value.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an attribute from any serializable value.
    ///
    /// Values that fail to serialize are stored as `null` rather than
    /// dropped, so the key still shows up in the entry.
    pub fn serialized(key: impl Into<String>, value: &impl Serialize) -> Self {
        Self {
            key: key.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }
}

/// A single log event on its way to the sinks.
///
/// Records are transient: sinks copy what they need (the ring buffer freezes
/// it into an [`Entry`](super::Entry)) and the caller drops the record after
/// dispatch.
#[derive(Debug, Clone)]
pub struct Record {
    /// Severity.
    pub level: Level,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Call-site attributes in the order they were given.
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    /// Append several attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

//! Frozen log entries as stored in the ring buffer and delivered to viewers.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::level::Level;

/// An immutable log entry.
///
/// Attribute keys are already flattened with their group prefix
/// (`server.addr`).  Serializes as
/// `{"timestamp": .., "level": "WARN", "msg": .., "attrs": {..}}`, with
/// `attrs` omitted when empty; this is the shape served to dashboard
/// snapshots and live tails alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// When the originating record was created.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: Level,
    /// Message text.
    #[serde(rename = "msg")]
    pub message: String,
    /// Flattened attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,
}

impl Entry {
    /// Look up a flattened attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }
}

//! Attribute and group scoping shared by every sink.
use std::collections::BTreeMap;

use serde_json::Value;

use super::entry::Entry;
use super::record::{Attr, Record};

/// Pre-attached attributes and group names carried by a derived sink.
///
/// A scope never changes after construction; [`with_attrs`](Self::with_attrs)
/// and [`with_group`](Self::with_group) return extended copies so loggers
/// derived earlier keep producing exactly what they produced before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    attrs: Vec<Attr>,
    groups: Vec<String>,
}

impl Scope {
    /// Copy of this scope with `more` appended to the pre-attached attributes.
    #[must_use]
    pub fn with_attrs(&self, more: &[Attr]) -> Self {
        let mut attrs = Vec::with_capacity(self.attrs.len() + more.len());
        attrs.extend_from_slice(&self.attrs);
        attrs.extend_from_slice(more);
        Self {
            attrs,
            groups: self.groups.clone(),
        }
    }

    /// Copy of this scope nested one group deeper.
    ///
    /// An empty name leaves the scope unchanged.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut groups = self.groups.clone();
        groups.push(name.to_string());
        Self {
            attrs: self.attrs.clone(),
            groups,
        }
    }

    /// Key prefix: the group names joined with `.` plus a trailing `.`, or
    /// the empty string at the root.
    #[must_use]
    pub fn prefix(&self) -> String {
        if self.groups.is_empty() {
            String::new()
        } else {
            format!("{}.", self.groups.join("."))
        }
    }

    /// Merge the scope's attributes with `record_attrs` under the prefix.
    ///
    /// Pre-attached attributes are written first, so a call-site attribute
    /// with the same key wins.
    #[must_use]
    pub fn flatten(&self, record_attrs: &[Attr]) -> BTreeMap<String, Value> {
        let prefix = self.prefix();
        self.attrs
            .iter()
            .chain(record_attrs)
            .map(|attr| (format!("{prefix}{}", attr.key), attr.value.clone()))
            .collect()
    }

    /// Freeze `record` into an [`Entry`] as seen through this scope.
    #[must_use]
    pub fn entry(&self, record: &Record) -> Entry {
        Entry {
            timestamp: record.timestamp,
            level: record.level,
            message: record.message.clone(),
            attrs: self.flatten(&record.attrs),
        }
    }

    /// Whether the scope adds nothing to a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.groups.is_empty()
    }
}

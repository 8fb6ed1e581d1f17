//! Ordered severity levels and their canonical names.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a log record.
///
/// Ordering follows severity: `Debug < Info < Warn < Error`.  The serialized
/// form is the canonical upper-case name (`"WARN"`), which is also what
/// [`Level::parse`] accepts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Verbose diagnostics, hidden on the console unless verbose.
    Debug = 0,
    /// Normal operational messages.
    #[default]
    Info = 1,
    /// Something unexpected that the proxy recovered from.
    Warn = 2,
    /// A failure affecting a request or a subsystem.
    Error = 3,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Parse a level name.
    ///
    /// Matches the four canonical names case-insensitively, ignoring
    /// surrounding whitespace.  Anything else maps to [`Level::Info`]; this
    /// never fails so that a typo in configuration cannot stop the proxy.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "WARN" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    pub(super) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(super) const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warn,
            _ => Self::Error,
        }
    }

    /// Map a [`tracing::Level`] onto the four-level scale (`TRACE` folds into
    /// `Debug`).
    #[must_use]
    pub fn from_tracing(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

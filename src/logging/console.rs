//! Human-readable console sink.
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use super::entry::Entry;
use super::level::Level;
use super::record::{Attr, Record};
use super::scope::Scope;
use super::sink::Sink;
use super::threshold::LevelThreshold;
use super::utils::{format_attrs, format_time};
use crate::error::SinkError;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes one colored line per record, gated by the process threshold.
///
/// Lines look like `12:04:33 WARN  upstream slow server.addr=10.0.0.1:443`.
/// The level tag is colored (red errors, yellow warnings, dim debug) and the
/// attributes are dimmed when color is on.  Derived sinks share the writer,
/// so lines from differently scoped loggers never interleave mid-line.
#[derive(Clone)]
pub struct ConsoleSink {
    writer: SharedWriter,
    threshold: LevelThreshold,
    scope: Scope,
    color: bool,
}

impl ConsoleSink {
    /// Console sink on standard error with color enabled.
    #[must_use]
    pub fn stderr(threshold: LevelThreshold) -> Self {
        Self::new(io::stderr(), threshold).with_color(true)
    }

    /// Console sink on an arbitrary writer, without color.
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static, threshold: LevelThreshold) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            threshold,
            scope: Scope::default(),
            color: false,
        }
    }

    /// Enable or disable ANSI color.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn format_line(&self, entry: &Entry) -> String {
        let time = format_time(&entry.timestamp);
        let attrs = format_attrs(&entry.attrs);
        let msg = &entry.message;
        if !self.color {
            return format!("{time} {:<5} {msg}{attrs}\n", entry.level.as_str());
        }
        let tag = match entry.level {
            Level::Error => "\x1b[31mERROR\x1b[0m",
            Level::Warn => "\x1b[33mWARN\x1b[0m ",
            Level::Info => "\x1b[32mINFO\x1b[0m ",
            Level::Debug => "\x1b[2mDEBUG\x1b[0m",
        };
        if attrs.is_empty() {
            format!("\x1b[2m{time}\x1b[0m {tag} {msg}\n")
        } else {
            format!("\x1b[2m{time}\x1b[0m {tag} {msg}\x1b[2m{attrs}\x1b[0m\n")
        }
    }

    fn derive(&self, scope: Scope) -> Box<dyn Sink> {
        Box::new(Self {
            writer: Arc::clone(&self.writer),
            threshold: self.threshold.clone(),
            scope,
            color: self.color,
        })
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("threshold", &self.threshold.get())
            .field("scope", &self.scope)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn enabled(&self, level: Level) -> bool {
        self.threshold.admits(level)
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let line = self.format_line(&self.scope.entry(record));
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| SinkError::io("console", e))
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Sink> {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Box<dyn Sink> {
        self.derive(self.scope.with_group(name))
    }
}

//! Scoped logging facade handed to request-handling code.
use std::sync::Arc;

use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;
use crate::error::SinkError;

/// Cheap, cloneable handle that turns calls into [`Record`]s for a sink.
///
/// Derived loggers ([`with_attrs`](Self::with_attrs),
/// [`with_group`](Self::with_group)) wrap a derived sink and never affect
/// the logger they came from.
#[derive(Debug, Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
}

impl Logger {
    /// Logger over `sink`, usually a [`Fanout`](super::Fanout).
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    fn from_boxed(sink: Box<dyn Sink>) -> Self {
        Self {
            sink: Arc::from(sink),
        }
    }

    /// Whether a record at `level` would reach any sink.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(level)
    }

    /// Dispatch `record`, returning the first sink failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first sink that failed; sinks after it were
    /// not offered the record.
    pub fn try_log(&self, record: &Record) -> Result<(), SinkError> {
        if !self.sink.enabled(record.level) {
            return Ok(());
        }
        self.sink.handle(record)
    }

    /// Log `message` at `level` with call-site attributes.
    ///
    /// Sink failures are discarded; logging never fails the caller.
    pub fn log(&self, level: Level, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        if !self.sink.enabled(level) {
            return;
        }
        let record = Record::new(level, message).with_attrs(attrs);
        let _ = self.sink.handle(&record);
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&self, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::Debug, message, attrs);
    }

    /// Log at [`Level::Info`].
    pub fn info(&self, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::Info, message, attrs);
    }

    /// Log at [`Level::Warn`].
    pub fn warn(&self, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::Warn, message, attrs);
    }

    /// Log at [`Level::Error`].
    pub fn error(&self, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::Error, message, attrs);
    }

    /// Derived logger whose records carry `attrs`.
    #[must_use]
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        Self::from_boxed(self.sink.with_attrs(&attrs))
    }

    /// Derived logger whose attributes are nested under `name`.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        Self::from_boxed(self.sink.with_group(name))
    }
}

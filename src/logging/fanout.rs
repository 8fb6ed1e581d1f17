//! Dispatch of one record to several sinks.
use super::level::Level;
use super::record::{Attr, Record};
use super::sink::Sink;
use crate::error::SinkError;

/// Ordered composition of sinks.
///
/// A record is offered to every sink whose own [`Sink::enabled`] accepts its
/// level, in construction order.  The first failing sink stops the dispatch
/// and its error is returned; sinks earlier in the list have already taken
/// the record, which is why the infallible in-memory sink should come first.
#[derive(Debug, Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn Sink>>,
}

impl Fanout {
    /// Compose `sinks` in dispatch order.
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Append a sink at the end of the dispatch order.
    pub fn push(&mut self, sink: impl Sink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of composed sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is composed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for Fanout {
    fn enabled(&self, level: Level) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        for sink in self.sinks.iter().filter(|sink| sink.enabled(record.level)) {
            sink.handle(record)?;
        }
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Sink> {
        Box::new(Self::new(
            self.sinks.iter().map(|sink| sink.with_attrs(attrs)).collect(),
        ))
    }

    fn with_group(&self, name: &str) -> Box<dyn Sink> {
        Box::new(Self::new(
            self.sinks.iter().map(|sink| sink.with_group(name)).collect(),
        ))
    }
}

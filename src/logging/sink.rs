//! The sink abstraction and the ring-buffer sink.
use std::fmt;

use super::level::Level;
use super::record::{Attr, Record};
use super::ring::RingBuffer;
use super::scope::Scope;
use crate::error::SinkError;

/// A destination for log records.
///
/// Each sink decides on its own whether it accepts a level, and derives
/// scoped copies of itself for [`Logger::with_attrs`](super::Logger::with_attrs)
/// and [`Logger::with_group`](super::Logger::with_group).  The
/// [`Fanout`](super::Fanout) dispatcher is itself a sink, so compositions
/// nest.
pub trait Sink: Send + Sync + fmt::Debug {
    /// Whether a record at `level` would be accepted.
    fn enabled(&self, level: Level) -> bool;

    /// Accept one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying destination fails to write.
    fn handle(&self, record: &Record) -> Result<(), SinkError>;

    /// A copy of this sink that adds `attrs` to every record.
    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Sink>;

    /// A copy of this sink that nests every attribute under `name`.
    fn with_group(&self, name: &str) -> Box<dyn Sink>;
}

/// Sink that freezes records into the shared [`RingBuffer`].
///
/// Accepts every level regardless of the process threshold, so viewers can
/// lower their own filter and still find the history.
#[derive(Debug, Clone)]
pub struct RingSink {
    ring: RingBuffer,
    scope: Scope,
}

impl RingSink {
    /// Wrap `ring` with an empty scope.
    #[must_use]
    pub fn new(ring: RingBuffer) -> Self {
        Self {
            ring,
            scope: Scope::default(),
        }
    }

    /// The buffer this sink writes to.
    #[must_use]
    pub const fn ring(&self) -> &RingBuffer {
        &self.ring
    }
}

impl Sink for RingSink {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        self.ring.add(self.scope.entry(record));
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Sink> {
        Box::new(Self {
            ring: self.ring.clone(),
            scope: self.scope.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Box<dyn Sink> {
        Box::new(Self {
            ring: self.ring.clone(),
            scope: self.scope.with_group(name),
        })
    }
}

//! Bridge from `tracing` events into the sink pipeline.
use std::fmt;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::facade::Logger;
use super::level::Level;
use super::record::{Attr, Record};
use super::system::LogSystem;

/// Target of the subsystem's own diagnostics (ring resize, system start).
///
/// [`SinkLayer`] never forwards these: a resize diagnostic written back into
/// the ring would evict a retained entry and reach live subscribers.
pub(super) const DIAGNOSTIC_TARGET: &str = "proxy_logbus::logging";

/// Collects the `message` field and every other field as an attribute.
#[derive(Default)]
struct FieldCollector {
    message: String,
    attrs: Vec<Attr>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push(field, Value::from(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }
}

/// A [`tracing_subscriber::Layer`] that forwards every event to a [`Logger`].
///
/// The event's `message` becomes the record message and its other fields
/// become attributes.  Names of the enclosing spans, outermost first, become
/// groups, so `info_span!("conn")` around `info!(peer = "x", "accepted")`
/// produces the attribute `conn.peer`.  `TRACE` events are folded into
/// [`Level::Debug`].  Events targeted at the subsystem's own diagnostics are
/// skipped so that logging about the ring never writes into it.
#[derive(Debug, Clone)]
pub struct SinkLayer {
    logger: Logger,
}

impl SinkLayer {
    /// Layer that hands events to `logger`.
    #[must_use]
    pub const fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> tracing_subscriber::Layer<S> for SinkLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == DIAGNOSTIC_TARGET {
            return;
        }
        let level = Level::from_tracing(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let mut logger = self.logger.clone();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                logger = logger.with_group(span.name());
            }
        }
        let record = Record::new(level, fields.message).with_attrs(fields.attrs);
        let _ = logger.try_log(&record);
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Installs a registry whose only layer is a [`SinkLayer`] over the system's
/// root logger, so `tracing` macros anywhere in the process reach the ring
/// buffer, console and file sinks.  Level gating happens in the sinks, which
/// keeps runtime threshold changes effective without rebuilding the
/// subscriber.  Must be called once at program startup.
pub fn init_subscriber(system: &LogSystem) {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    tracing_subscriber::registry()
        .with(SinkLayer::new(system.logger().clone()))
        .init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{RingBuffer, RingSink};
    use tracing_subscriber::layer::SubscriberExt as _;

    fn with_ring<F: FnOnce()>(f: F) -> RingBuffer {
        let ring = RingBuffer::new(16);
        let layer = SinkLayer::new(Logger::new(RingSink::new(ring.clone())));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        ring
    }

    #[test]
    fn event_fields_become_attrs() {
        let ring = with_ring(|| {
            tracing::warn!(status = 502_u64, retry = true, host = "example.org", "bad gateway");
        });
        let entries = ring.recent(0, Level::Debug);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.level, Level::Warn);
        assert_eq!(entry.message, "bad gateway");
        assert_eq!(entry.attrs["status"], 502);
        assert_eq!(entry.attrs["retry"], true);
        assert_eq!(entry.attrs["host"], "example.org");
    }

    #[test]
    fn spans_become_groups() {
        let ring = with_ring(|| {
            let conn = tracing::info_span!("conn");
            let _conn = conn.enter();
            let tls = tracing::info_span!("tls");
            let _tls = tls.enter();
            tracing::error!(sni = "example.org", "handshake failed");
        });
        let entries = ring.recent(0, Level::Debug);
        assert_eq!(entries[0].attrs["conn.tls.sni"], "example.org");
    }

    #[test]
    fn trace_is_folded_into_debug() {
        let ring = with_ring(|| tracing::trace!("wire bytes"));
        let entries = ring.recent(0, Level::Debug);
        assert_eq!(entries[0].level, Level::Debug);
        assert_eq!(entries[0].message, "wire bytes");
    }

    #[test]
    fn resize_diagnostic_stays_out_of_the_ring() {
        let ring = RingBuffer::new(1000);
        let layer = SinkLayer::new(Logger::new(RingSink::new(ring.clone())));
        let subscriber = tracing_subscriber::registry().with(layer);
        let sub = tracing::subscriber::with_default(subscriber, || {
            for i in 0..5 {
                tracing::info!("{i}");
            }
            let sub = ring.subscribe(Level::Debug);
            ring.resize(3);
            sub
        });
        assert!(sub.drain().is_empty(), "resize must not notify subscribers");
        let kept: Vec<_> = ring
            .recent(0, Level::Debug)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(kept, ["2", "3", "4"]);
    }

    #[test]
    fn other_targets_still_pass_through() {
        let ring = with_ring(|| {
            tracing::info!(target: "proxy_logbus::commands::tail", "tail finished");
        });
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn debug_formatted_fields_are_strings() {
        let ring = with_ring(|| {
            let path = std::path::PathBuf::from("/tmp/x");
            tracing::info!(path = ?path, "opened");
        });
        let entries = ring.recent(0, Level::Debug);
        assert_eq!(entries[0].attrs["path"], "\"/tmp/x\"");
    }
}

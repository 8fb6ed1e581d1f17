//! Process-wide wiring of the ring buffer, threshold and sinks.
use super::console::ConsoleSink;
use super::facade::Logger;
use super::fanout::Fanout;
use super::file::FileSink;
use super::layer::DIAGNOSTIC_TARGET;
use super::level::Level;
use super::ring::RingBuffer;
use super::sink::{RingSink, Sink};
use super::threshold::LevelThreshold;
use crate::config::LoggingConfig;
use crate::error::SinkError;

/// The assembled logging subsystem.
///
/// Owns the shared [`RingBuffer`] (history plus live subscribers), the
/// process [`LevelThreshold`] gating the console and file sinks, and the root
/// [`Logger`].  Sinks are composed in lossless-first order: ring, console,
/// file, then any extra sinks, so a failing output never costs the ring an
/// entry.
#[derive(Debug, Clone)]
pub struct LogSystem {
    ring: RingBuffer,
    threshold: LevelThreshold,
    logger: Logger,
}

impl LogSystem {
    /// Build the subsystem with the console on standard error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured log file cannot be opened.
    pub fn init(config: &LoggingConfig) -> Result<Self, SinkError> {
        Self::with_console(config, ConsoleSink::stderr, Vec::new())
    }

    /// Build the subsystem with a caller-supplied console sink and extra
    /// sinks appended after the built-in ones.
    ///
    /// `console` receives the process threshold and is only called when the
    /// configuration enables the console.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured log file cannot be opened.
    pub fn with_console(
        config: &LoggingConfig,
        console: impl FnOnce(LevelThreshold) -> ConsoleSink,
        extra: Vec<Box<dyn Sink>>,
    ) -> Result<Self, SinkError> {
        let ring = RingBuffer::from_config(config.buffer_size);
        let threshold = LevelThreshold::new(config.threshold_level());

        let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(RingSink::new(ring.clone()))];
        if config.console {
            sinks.push(Box::new(console(threshold.clone())));
        }
        if let Some(path) = &config.file {
            sinks.push(Box::new(FileSink::open(path, threshold.clone())?));
        }
        sinks.extend(extra);
        let fanout = Fanout::new(sinks);

        tracing::debug!(
            target: DIAGNOSTIC_TARGET,
            capacity = ring.capacity(),
            level = %threshold.get(),
            sinks = fanout.len(),
            "log system initialised"
        );

        Ok(Self {
            ring,
            threshold,
            logger: Logger::new(fanout),
        })
    }

    /// Apply a new configuration at runtime.
    ///
    /// Resizes the ring (non-positive sizes are ignored) and sets the
    /// threshold.  Sink composition is fixed at construction.
    pub fn reload(&self, config: &LoggingConfig) {
        if let Ok(size) = usize::try_from(config.buffer_size)
            && size > 0
            && size != self.ring.capacity()
        {
            self.ring.resize(size);
        }
        self.threshold.set(config.threshold_level());
    }

    /// Set the process threshold.
    pub fn set_level(&self, level: Level) {
        self.threshold.set(level);
    }

    /// Current process threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        self.threshold.get()
    }

    /// The shared ring buffer.
    #[must_use]
    pub const fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// The process threshold cell.
    #[must_use]
    pub const fn threshold(&self) -> &LevelThreshold {
        &self.threshold
    }

    /// The root logger.
    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }
}

//! Shared, runtime-adjustable severity threshold.
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use super::level::Level;

/// A minimum severity shared by every clone of the handle.
///
/// The process-wide threshold is one `LevelThreshold` handed to the console
/// and file sinks at startup; reconfiguration (for example a verbose toggle)
/// writes through any clone and every sink sees the new value on its next
/// [`enabled`](crate::logging::Sink::enabled) check.  Subscriptions reuse the
/// same type for their private filters.
#[derive(Debug, Clone)]
pub struct LevelThreshold {
    level: Arc<AtomicU8>,
}

impl LevelThreshold {
    /// Create a threshold starting at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level.as_u8())),
        }
    }

    /// Current minimum level.
    #[must_use]
    pub fn get(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Acquire))
    }

    /// Replace the minimum level.
    pub fn set(&self, level: Level) {
        self.level.store(level.as_u8(), Ordering::Release);
    }

    /// Whether `level` is at or above the threshold.
    #[must_use]
    pub fn admits(&self, level: Level) -> bool {
        level >= self.get()
    }
}

impl Default for LevelThreshold {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

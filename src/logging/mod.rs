//! Structured log history, live fan-out, and sink composition.
//!
//! Records enter through a [`Logger`] (or through `tracing` macros via
//! [`SinkLayer`]), pass through a [`Fanout`] of sinks, and land in the
//! bounded [`RingBuffer`] that serves both history queries and live
//! [`Subscription`]s.

mod console;
mod entry;
mod facade;
mod fanout;
mod file;
mod layer;
mod level;
mod record;
mod ring;
mod scope;
mod sink;
mod subscriber;
mod system;
mod threshold;
mod utils;

pub use console::ConsoleSink;
pub use entry::Entry;
pub use facade::Logger;
pub use fanout::Fanout;
pub use file::FileSink;
pub use layer::{SinkLayer, init_subscriber};
pub use level::Level;
pub use record::{Attr, Record};
pub use ring::{DEFAULT_CAPACITY, RingBuffer, RingStats};
pub use scope::Scope;
pub use sink::{RingSink, Sink};
pub use subscriber::{Closed, SUBSCRIBER_QUEUE_DEPTH, Subscription};
pub use system::LogSystem;
pub use threshold::LevelThreshold;

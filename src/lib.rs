//! Log distribution for an inspecting proxy.
//!
//! A bounded in-memory history of structured log entries that also fans
//! every new entry out to live subscribers, behind a scoped logging facade
//! that feeds several sinks at once.
//!
//! The public API is organised into four layers:
//!
//! - **[`logging`]**: entries, the ring buffer, subscriptions, sinks and the facade
//! - **[`config`]**: the `logbus.toml` loader
//! - **[`error`]**: sink and configuration errors
//! - **[`commands`]**: top-level subcommand orchestration (`stress`, `tail`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

//! Subcommand implementations.
pub mod stress;
pub mod tail;
pub mod version;

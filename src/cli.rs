use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the log distribution tool.
#[derive(Parser, Debug)]
#[command(
    name = "logbus",
    about = "Structured log history and live fan-out",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "logbus.toml")]
    pub config: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive concurrent producers and subscribers through the ring buffer
    Stress(StressOpts),
    /// Follow live log entries as JSON lines
    Tail(TailOpts),
    /// Print version information
    Version,
}

/// Options for the `stress` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct StressOpts {
    /// Number of concurrent producers
    #[arg(long, default_value_t = 4)]
    pub producers: usize,

    /// Records written by each producer
    #[arg(long, default_value_t = 1000)]
    pub records: usize,

    /// Number of live subscribers
    #[arg(long, default_value_t = 2)]
    pub subscribers: usize,

    /// Override the configured ring capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Number of most recent entries to print as JSON
    #[arg(long, default_value_t = 10)]
    pub show: usize,
}

/// Options for the `tail` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct TailOpts {
    /// Minimum level to follow
    #[arg(long, default_value = "DEBUG")]
    pub min_level: String,

    /// Stop after this many entries (0 follows until interrupted)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub count: usize,

    /// Print buffered history before following
    #[arg(long)]
    pub history: bool,

    /// Emit synthetic traffic every N milliseconds (0 disables)
    #[arg(long, default_value_t = 250)]
    pub interval_ms: u64,
}

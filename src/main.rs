use anyhow::{Context as _, Result};
use clap::Parser;

use proxy_logbus::cli::{Cli, Command};
use proxy_logbus::commands;
use proxy_logbus::config::Config;
use proxy_logbus::logging::{self, LogSystem};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let mut config = Config::load(&args.config)?;
    config.logging.verbose |= args.verbose;
    let system = LogSystem::init(&config.logging).context("failed to initialise logging")?;
    logging::init_subscriber(&system);
    tracing::debug!(config = %args.config.display(), "configuration loaded");

    match args.command {
        Command::Stress(opts) => commands::stress::run(&opts, &system),
        Command::Tail(opts) => commands::tail::run(&opts, &system),
        Command::Version => Ok(()),
    }
}

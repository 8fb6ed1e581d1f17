//! Runtime configuration loaded from `logbus.toml`.
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::{DEFAULT_CAPACITY, Level};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The `[logging]` table.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load the configuration at `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }
}

/// Settings for the log distribution subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Ring buffer capacity; non-positive values select the default.
    pub buffer_size: i64,
    /// Process threshold name, parsed case-insensitively.
    pub level: String,
    /// Force the threshold to `DEBUG`.
    pub verbose: bool,
    /// Compose the console sink.
    pub console: bool,
    /// Compose a durable file sink at this path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            buffer_size: i64::try_from(DEFAULT_CAPACITY).unwrap_or(i64::MAX),
            level: Level::Info.as_str().to_string(),
            verbose: false,
            console: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Effective process threshold.
    #[must_use]
    pub fn threshold_level(&self) -> Level {
        if self.verbose {
            Level::Debug
        } else {
            Level::parse(&self.level)
        }
    }
}

//! Error types for the log distribution subsystem.
//!
//! Only the sink boundary and configuration loading can fail.  The ring
//! buffer and subscriber registry are infallible by construction: a full
//! buffer overwrites, a full subscriber queue drops.  Command handlers at
//! the CLI boundary convert these errors to [`anyhow::Error`] via `?`.
//!
//! ```text
//! SinkError   — console / file write failures, surfaced by Fanout::handle
//! ConfigError — reading or parsing the TOML configuration
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// A sink failed to accept a record.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to the sink's destination failed.
    #[error("{sink} sink write failed: {source}")]
    Io {
        /// Name of the failing sink (e.g. `"console"`, `"file"`).
        sink: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The durable log file could not be opened.
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl SinkError {
    /// Wrap an I/O error raised while writing to `sink`.
    #[must_use]
    pub const fn io(sink: &'static str, source: std::io::Error) -> Self {
        Self::Io { sink, source }
    }
}

/// Errors that arise from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("Invalid TOML in {}: {source}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn sink_io_display_names_sink() {
        let e = SinkError::io("file", io::Error::other("disk full"));
        assert_eq!(e.to_string(), "file sink write failed: disk full");
    }

    #[test]
    fn sink_open_display_includes_path() {
        let e = SinkError::Open {
            path: PathBuf::from("/var/log/proxy.log"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/var/log/proxy.log"));
    }

    #[test]
    fn sink_error_has_source() {
        use std::error::Error as StdError;
        let e = SinkError::io("console", io::Error::other("broken pipe"));
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/logbus.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/etc/logbus.toml"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_parse_display() {
        let source = toml::from_str::<toml::Value>("= nope").expect_err("invalid toml");
        let e = ConfigError::Parse {
            path: PathBuf::from("logbus.toml"),
            source,
        };
        assert!(e.to_string().starts_with("Invalid TOML in logbus.toml"));
    }
}

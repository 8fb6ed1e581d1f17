//! Durable file sink.
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::level::Level;
use super::record::{Attr, Record};
use super::scope::Scope;
use super::sink::Sink;
use super::threshold::LevelThreshold;
use super::utils::{format_attrs, format_timestamp_us, strip_ansi};
use crate::error::SinkError;

/// Appends one plain-text line per record to a log file.
///
/// Lines are `[<utc-us>] LEVEL message key=value ...` with ANSI codes
/// stripped.  Gated by the process threshold like the console sink.
/// Rotation is left to the host (logrotate with `copytruncate`, or a
/// restart); the sink only ever appends.
#[derive(Debug, Clone)]
pub struct FileSink {
    file: Arc<Mutex<File>>,
    path: Arc<PathBuf>,
    threshold: LevelThreshold,
    scope: Scope,
}

impl FileSink {
    /// Open (or create) `path` for appending, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the directory or file cannot be
    /// created.
    pub fn open(path: &Path, threshold: LevelThreshold) -> Result<Self, SinkError> {
        let open_err = |source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            path: Arc::new(path.to_path_buf()),
            threshold,
            scope: Scope::default(),
        })
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn derive(&self, scope: Scope) -> Box<dyn Sink> {
        Box::new(Self {
            file: Arc::clone(&self.file),
            path: Arc::clone(&self.path),
            threshold: self.threshold.clone(),
            scope,
        })
    }
}

impl Sink for FileSink {
    fn enabled(&self, level: Level) -> bool {
        self.threshold.admits(level)
    }

    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let entry = self.scope.entry(record);
        let line = format!(
            "[{}] {:<5} {}{}\n",
            format_timestamp_us(&entry.timestamp),
            entry.level.as_str(),
            strip_ansi(&entry.message),
            format_attrs(&entry.attrs),
        );
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(line.as_bytes())
            .map_err(|e| SinkError::io("file", e))
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Sink> {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Box<dyn Sink> {
        self.derive(self.scope.with_group(name))
    }
}

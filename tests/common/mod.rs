// Shared helpers for integration tests.
//
// Provides an isolated log system whose console output is captured in
// memory, plus a temporary directory for config and log files, so each
// integration test can run without touching the real terminal or disk.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use proxy_logbus::config::{Config, LoggingConfig};
use proxy_logbus::logging::{ConsoleSink, LogSystem, Sink};

/// In-memory writer whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written lines, without trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An isolated log system backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory for config and log files.
    pub root: tempfile::TempDir,
    /// The assembled system under test.
    pub system: LogSystem,
    /// Captured console output.
    pub console: CapturedOutput,
}

impl IntegrationTestContext {
    /// Context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LoggingConfig::default(), Vec::new())
    }

    /// Context built from `config` plus `extra` sinks.
    pub fn with_config(config: LoggingConfig, extra: Vec<Box<dyn Sink>>) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let console = CapturedOutput::default();
        let writer = console.clone();
        let system =
            LogSystem::with_console(&config, move |t| ConsoleSink::new(writer, t), extra)
                .expect("build log system");
        Self {
            root,
            system,
            console,
        }
    }

    /// Path to the temporary directory.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write `contents` to `logbus.toml` in the temp dir and load it.
    pub fn write_config(&self, contents: &str) -> (PathBuf, Config) {
        let path = self.root_path().join("logbus.toml");
        std::fs::write(&path, contents).expect("write logbus.toml");
        let config = Config::load(&path).expect("load logbus.toml");
        (path, config)
    }
}

//! Configuration for RecordDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::error::{RecordError, Result};

/// Main configuration for a RecordDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── documents/       (one file per document, `<_id>.<ext>`)
    pub data_dir: PathBuf,

    /// Extension of per-document files (without the dot)
    pub file_extension: String,

    /// Load previously persisted documents into memory on open
    pub recover_on_open: bool,

    // -------------------------------------------------------------------------
    // Worker Pool Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads executing storage operations
    pub worker_threads: usize,

    /// How long `stop` waits for in-flight tasks before forcing shutdown
    /// (milliseconds)
    pub shutdown_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./recorddb_data"),
            file_extension: "bin".to_string(),
            recover_on_open: false,
            worker_threads: default_worker_threads(),
            shutdown_grace_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Grace period for draining the worker pool on stop
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(RecordError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }

        let ext = self.file_extension.as_str();
        if ext.is_empty() || ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(RecordError::Config(format!(
                "invalid file extension: {:?}",
                self.file_extension
            )));
        }

        Ok(())
    }
}

/// One worker per available core
fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the per-document file extension
    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    /// Enable or disable loading persisted documents on open
    pub fn recover_on_open(mut self, enabled: bool) -> Self {
        self.config.recover_on_open = enabled;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the shutdown grace period (in milliseconds)
    pub fn shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_grace_ms = ms;
        self
    }

    /// Set the shutdown grace period in whole seconds (saturating)
    pub fn shutdown_grace_secs(mut self, secs: u64) -> Self {
        self.config.shutdown_grace_ms = secs.saturating_mul(1000);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

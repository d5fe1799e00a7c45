use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::ScanResult;

/// Name of the optional per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".onebrc.yaml";

/// Settings for one aggregation run.
///
/// Loaded from YAML, lowest precedence first:
/// 1. `./.onebrc.yaml` if it exists
/// 2. the file passed with `--config`
///
/// Command-line flags are applied on top with [`ScanConfig::merge_with_cli`].
///
/// ```yaml
/// # Worker count (default: logical CPUs)
/// thread_count: 8
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File of `station;value` lines to aggregate
    #[serde(default)]
    pub input_path: PathBuf,

    /// Number of workers, and therefore segments
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the local file and an optional explicit one.
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            builder = builder.add_source(File::from(local.as_path()));
        }
        if let Some(path) = config_path {
            // An explicit file must exist.
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Applies command-line values; anything given on the CLI wins.
    pub fn merge_with_cli(
        mut self,
        input_path: PathBuf,
        thread_count: Option<NonZeroUsize>,
        log_level: Option<String>,
    ) -> Self {
        self.input_path = input_path;
        if let Some(threads) = thread_count {
            self.thread_count = threads;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }
}

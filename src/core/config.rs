//! Configuration management for gcmon.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI overrides (applied by the CLI layer)
//! - Validation and defaults

use crate::core::{GcmonError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for gcmon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sampling configuration
    pub sampling: SamplingConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// PerfData source configuration
    pub source: SourceConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Time between sampling ticks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Stop after this many ticks (run until interrupted when absent)
    pub count: Option<u64>,
    /// Extra counters to report, keyed by output label
    pub extra_counters: BTreeMap<String, String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Row format
    pub format: OutputFormat,
    /// Table column set
    pub mode: ReportMode,
    /// Repeat the column header every N rows (0 = only once)
    pub header_every: usize,
}

/// PerfData source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory that holds the `hsperfdata_<user>` directories
    /// (defaults to the system temp directory)
    pub perf_data_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include targets, thread ids and line numbers
    pub structured: bool,
}

/// Row formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

/// Table column sets, after jstat's `-gc`, `-gccapacity`, `-gcutil` and
/// `-gccause` style views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Capacity and usage per space, collector counts and times
    #[default]
    Gc,
    /// Generation bounds and space capacities
    Capacity,
    /// Free space and utilization per space
    Util,
    /// Average, interval and share of GC time per collector
    Time,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            interval: Duration::from_secs(1),
            count: None,
            extra_counters: BTreeMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: OutputFormat::Table,
            mode: ReportMode::Gc,
            header_every: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Warn,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval.is_zero() {
            return Err(GcmonError::config("sampling interval must be greater than 0"));
        }

        if self.sampling.count == Some(0) {
            return Err(GcmonError::config("sample count must be greater than 0 when set"));
        }

        for (label, counter) in &self.sampling.extra_counters {
            if label.trim().is_empty() {
                return Err(GcmonError::config(format!(
                    "extra counter '{}' has an empty label",
                    counter
                )));
            }
            if crate::sample::is_standard_label(label) {
                return Err(GcmonError::config(format!(
                    "extra counter label '{}' is reserved for a standard GC statistic",
                    label
                )));
            }
            if counter.trim().is_empty() {
                return Err(GcmonError::config(format!(
                    "extra counter label '{}' has an empty counter name",
                    label
                )));
            }
        }

        if let Some(dir) = &self.source.perf_data_dir {
            if dir.as_os_str().is_empty() {
                return Err(GcmonError::config("perf_data_dir must not be empty"));
            }
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| GcmonError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set sampling interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.sampling.interval = interval;
        self
    }

    /// Set sample count
    pub fn count(mut self, count: u64) -> Self {
        self.config.sampling.count = Some(count);
        self
    }

    /// Add an extra counter to report
    pub fn extra_counter(mut self, label: &str, counter: &str) -> Self {
        self.config
            .sampling
            .extra_counters
            .insert(label.to_string(), counter.to_string());
        self
    }

    /// Set output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set table column set
    pub fn mode(mut self, mode: ReportMode) -> Self {
        self.config.output.mode = mode;
        self
    }

    /// Set the hsperfdata parent directory
    pub fn perf_data_dir(mut self, path: PathBuf) -> Self {
        self.config.source.perf_data_dir = Some(path);
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

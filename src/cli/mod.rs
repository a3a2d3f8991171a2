//! Command-line interface for gcmon.
//!
//! `gcmon <pid>` prints jstat-style GC statistics for a running JVM once
//! per interval until interrupted.

use crate::core::config::{Config, ConfigBuilder, OutputFormat, ReportMode};
use crate::core::{GcmonError, Result};
use crate::monitor::Session;
use crate::report::{self, TableReport};
use crate::source::{MappedPerfData, PerfSource, Target};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Read-only GC statistics from a JVM's hsperfdata file
#[derive(Parser, Debug)]
#[command(name = "gcmon")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Process id, or path to an hsperfdata file
    pub target: Option<String>,

    /// Time between samples (e.g. 500ms, 2s)
    #[arg(short, long, env = "GCMON_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Number of samples to take before exiting
    #[arg(short = 'n', long, env = "GCMON_COUNT")]
    pub count: Option<u64>,

    /// Print one JSON object per sample instead of a table
    #[arg(long)]
    pub json: bool,

    /// Table column set
    #[arg(short, long, value_enum, env = "GCMON_MODE")]
    pub mode: Option<ReportMode>,

    /// List every published counter and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print the named counter and exit (repeatable)
    #[arg(long = "counter", value_name = "NAME")]
    pub counters: Vec<String>,

    /// Directory holding the hsperfdata_<user> directories
    #[arg(long, env = "GCMON_PERF_DATA_DIR")]
    pub perf_data_dir: Option<PathBuf>,

    /// Configuration file path (default: ~/.config/gcmon/config.yaml)
    #[arg(short, long, env = "GCMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "GCMON_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "show-version")]
    pub version: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            let default_path = dirs::config_dir()
                .map(|d| d.join("gcmon").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("~/.config/gcmon/config.yaml"));

            if default_path.exists() {
                default_path
            } else {
                return self.build_config_from_args(builder);
            }
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
            },
            Err(e) if self.config.is_some() => {
                return Err(GcmonError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {},
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(interval) = self.interval {
            builder = builder.interval(interval);
        }
        if let Some(count) = self.count {
            builder = builder.count(count);
        }
        if self.json {
            builder = builder.format(OutputFormat::Json);
        }
        if let Some(mode) = self.mode {
            builder = builder.mode(mode);
        }
        if let Some(dir) = &self.perf_data_dir {
            builder = builder.perf_data_dir(dir.clone());
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging to stderr, keeping stdout for sample rows.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let level = log_level(config);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_line_number(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| GcmonError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Filter directive: debug mode, then `GCMON_LOG_LEVEL`, then the config file.
fn log_level(config: &Config) -> String {
    if config.debug {
        return "debug".to_string();
    }
    std::env::var("GCMON_LOG_LEVEL").unwrap_or_else(|_| config.logging.level.as_str().to_string())
}

/// Execute the gcmon application.
pub async fn execute(cli: Cli) -> Result<()> {
    if cli.version {
        println!("gcmon {}", env!("CARGO_PKG_VERSION"));
        println!("Read-only HotSpot PerfData GC monitor");
        return Ok(());
    }

    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!("  Interval: {:?}", config.sampling.interval);
        println!("  Count: {}", config.sampling.count.map_or_else(|| "unlimited".to_string(), |c| c.to_string()));
        println!("  Format: {:?}", config.output.format);
        println!("  Mode: {:?}", config.output.mode);
        println!("  Extra counters: {}", config.sampling.extra_counters.len());
        return Ok(());
    }

    let target: Target = cli
        .target
        .as_deref()
        .ok_or_else(|| GcmonError::config("missing target: pass a pid or an hsperfdata path"))?
        .parse()?;
    let path = target.locate(config.source.perf_data_dir.as_deref())?;
    let source = MappedPerfData::open(&path)?;
    tracing::info!("Monitoring {}", path.display());

    if cli.list {
        return list_counters(&source);
    }
    if !cli.counters.is_empty() {
        return print_counters(&source, &cli.counters);
    }

    run_sampling(&config, &source).await
}

fn list_counters(source: &dyn PerfSource) -> Result<()> {
    let buf = source.bytes();
    let index = crate::perf::CounterIndex::from_buffer(buf)?;
    for line in report::counter_listing(&index, buf) {
        println!("{line}");
    }
    Ok(())
}

fn print_counters(source: &dyn PerfSource, names: &[String]) -> Result<()> {
    let buf = source.bytes();
    let index = crate::perf::CounterIndex::from_buffer(buf)?;
    for name in names {
        println!("{}", report::counter_value(&index, buf, name)?);
    }
    Ok(())
}

async fn run_sampling(config: &Config, source: &dyn PerfSource) -> Result<()> {
    let mut session = Session::from_config(&config.sampling)?;
    let mut table: Option<TableReport> = None;
    let mut taken = 0u64;

    let mut interval = tokio::time::interval(config.sampling.interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal, stopping...");
                return Ok(());
            }
        }

        let sample = match session.tick(source.bytes()) {
            Ok(sample) => sample,
            Err(e) if e.is_recoverable() => {
                tracing::warn!(category = e.category(), "Skipping sample: {}", e);
                continue;
            },
            Err(e) => return Err(e),
        };

        match config.output.format {
            OutputFormat::Json => println!("{}", report::json_line(&sample)?),
            OutputFormat::Table => {
                let table = table.get_or_insert_with(|| TableReport::new(&sample, config.output.mode, config.output.header_every));
                for line in table.render(&sample) {
                    println!("{line}");
                }
            },
        }

        taken += 1;
        if config.sampling.count.is_some_and(|count| taken >= count) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["gcmon", "1234", "--interval", "250ms", "-n", "5", "--json"]);

        assert_eq!(cli.target.as_deref(), Some("1234"));
        assert_eq!(cli.interval, Some(Duration::from_millis(250)));
        assert_eq!(cli.count, Some(5));
        assert!(cli.json);
        assert!(!cli.list);
        assert!(cli.counters.is_empty());
    }

    #[test]
    fn test_repeated_counter_flag() {
        let cli = Cli::parse_from([
            "gcmon",
            "/tmp/hsperfdata_me/42",
            "--counter",
            "java.threads.live",
            "--counter",
            "sun.rt.javaCommand",
        ]);
        assert_eq!(cli.counters, vec!["java.threads.live", "sun.rt.javaCommand"]);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["gcmon", "1", "--interval", "3s", "--json"]);
        let builder = ConfigBuilder::new()
            .from_yaml("sampling:\n  interval: 1s\n  count: 4\n")
            .unwrap();

        let config = cli.build_config_from_args(builder).unwrap();
        assert_eq!(config.sampling.interval, Duration::from_secs(3));
        assert_eq!(config.sampling.count, Some(4));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_mode_flag() {
        let cli = Cli::parse_from(["gcmon", "1", "--mode", "time"]);
        let config = cli.build_config_from_args(ConfigBuilder::new()).unwrap();
        assert_eq!(config.output.mode, ReportMode::Time);
    }

    #[test]
    fn test_debug_flag_forces_debug_logging() {
        let cli = Cli::parse_from(["gcmon", "1", "--debug"]);
        let config = cli.build_config_from_args(ConfigBuilder::new()).unwrap();
        assert!(config.debug);
        assert_eq!(log_level(&config), "debug");
    }
}

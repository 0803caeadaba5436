//! diskstat-plugin - disk I/O metrics plugin for monitoring agents.
//!
//! Prints one `key\tvalue\tepoch` line per metric on stdout, or the graph
//! definitions when the agent asks for plugin metadata.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser};
use diskstat_plugin::config::{self, Config};
use diskstat_plugin::graph::{graph_definitions, META_ENV};
use diskstat_plugin::output::{write_meta, write_metrics};
use diskstat_plugin::{DiskCollector, MetricCatalogue};
use std::io;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Linux disk I/O metrics plugin reading /proc/diskstats
#[derive(Parser, Debug)]
#[command(name = "diskstat-plugin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Metric key prefix
    #[arg(long, default_value = config::DEFAULT_KEY_PREFIX)]
    metric_key_prefix: String,

    /// Ignore virtual block devices (loop, ram, device-mapper)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    ignore_virtual: bool,

    /// Disk statistics file to read
    #[arg(long, default_value = config::DEFAULT_DISKSTATS_PATH)]
    diskstats: PathBuf,

    /// Block device registry used to detect virtual devices
    #[arg(long, default_value = config::DEFAULT_SYS_BLOCK_PATH)]
    sys_block: PathBuf,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            key_prefix: args.metric_key_prefix.clone(),
            ignore_virtual: args.ignore_virtual,
            diskstats_path: args.diskstats.clone(),
            sys_block_path: args.sys_block.clone(),
        }
    }
}

/// Initialize tracing on stderr; stdout carries the plugin output.
fn setup_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if std::env::var(META_ENV).is_ok_and(|v| v == "1") {
        return write_meta(&mut out, &graph_definitions(config.key_prefix()));
    }

    let catalogue = MetricCatalogue::new();
    let collector = DiskCollector::new(&catalogue, config);
    let metrics = collector.collect().with_context(|| {
        format!(
            "Failed to collect disk metrics from {}",
            config.diskstats_path.display()
        )
    })?;

    write_metrics(&mut out, config.key_prefix(), &metrics, Utc::now().timestamp())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let config = Config::from(&args);
    if let Ok(json) = serde_json::to_string(&config) {
        debug!(config = %json, "starting");
    }

    if let Err(e) = run(&config) {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

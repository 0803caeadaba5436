//! Linux disk I/O metrics for monitoring agent plugins.
//!
//! Reads `/proc/diskstats`, optionally drops virtual block devices found
//! under `/sys/block`, and reshapes the counters into a flat map of
//! `<category>.<device>.<subfield>` metric keys.

pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod output;

pub use config::Config;
pub use error::CollectError;
pub use metrics::{DiskCollector, MetricCatalogue, MetricMapping};

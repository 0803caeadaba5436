//! Mapping of diskstats counters onto metric keys.

use super::diskstats::DiskstatsRow;
use crate::error::{CollectError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Metric name to value, keyed `<category>.<device>.<subfield>`.
pub type MetricMapping = BTreeMap<String, f64>;

/// Counter templates in /proc/diskstats column order.
///
/// Discards were introduced in kernel 4.18 and flushes in 5.5, see
/// Documentation/admin-guide/iostats.rst.
pub const METRIC_NAMES: [&str; 17] = [
    "request.reads",
    "merge.reads",
    "sector.read",
    "time.read",
    "request.writes",
    "merge.writes",
    "sector.written",
    "time.write",
    "inprogress.io",
    "time.io",
    "time.ioWeighted",
    "request.discards",
    "merge.discards",
    "sector.Discarded",
    "time.discard",
    "request.flushes",
    "time.flush",
];

/// Categories reported to the agent as per-minute values.
///
/// The agent computes `(cur - last) * 60 / elapsed` for diff metrics, so
/// pre-dividing by 60 turns its per-minute rate into a per-second one.
const PER_SECOND_CATEGORIES: [&str; 4] = ["request", "merge", "sector", "time"];

const DEVICE_NAME_PATTERN: &str = r"[^[:alnum:]_-]";

/// Immutable metric naming tables, built once per process.
#[derive(Debug, Clone)]
pub struct MetricCatalogue {
    names: &'static [&'static str],
    device_name_pattern: Regex,
}

impl MetricCatalogue {
    pub fn new() -> Self {
        Self {
            names: &METRIC_NAMES,
            device_name_pattern: Regex::new(DEVICE_NAME_PATTERN)
                .expect("device name pattern is valid"),
        }
    }

    pub fn names(&self) -> &[&'static str] {
        self.names
    }

    /// Strip every character outside `[A-Za-z0-9_-]` from a device name.
    pub fn sanitize_device_name(&self, device: &str) -> String {
        self.device_name_pattern.replace_all(device, "").into_owned()
    }

    /// Normalize one row's counters into `metrics`, keyed by `label`.
    ///
    /// Counters are matched by position, so rows with 11, 15 or 17 counters
    /// all work. A token that is not a number aborts with `MalformedRow`.
    pub fn normalize(
        &self,
        label: &str,
        row: &DiskstatsRow,
        metrics: &mut MetricMapping,
    ) -> Result<()> {
        let counters = row.counters();
        if counters.len() > self.names.len() {
            debug!(
                device = label,
                extra = counters.len() - self.names.len(),
                "ignoring unknown diskstats columns"
            );
        }

        for (&name, token) in self.names.iter().zip(counters) {
            let value: f64 = token.parse().map_err(|_| CollectError::MalformedRow {
                device: row.device().unwrap_or(label).to_string(),
                field: name,
                token: token.clone(),
            })?;

            let (category, subfield) = name.split_once('.').unwrap_or((name, ""));
            let key = format!("{category}.{label}.{subfield}");

            let value = if PER_SECOND_CATEGORIES.contains(&category) {
                value / 60.0
            } else {
                value
            };
            metrics.insert(key, value);
        }

        Ok(())
    }
}

impl Default for MetricCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

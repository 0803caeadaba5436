//! Plugin protocol output.
//!
//! Values are written one per line as `key\tvalue\tepoch`; graph definitions
//! as a header line followed by a JSON document.

use crate::graph::{GraphDefinitions, META_HEADER};
use crate::metrics::MetricMapping;
use anyhow::{Context, Result};
use std::io::Write;

/// Write every metric under `prefix`, sorted by key.
pub fn write_metrics<W: Write>(
    writer: &mut W,
    prefix: &str,
    metrics: &MetricMapping,
    epoch: i64,
) -> Result<()> {
    for (key, value) in metrics {
        writeln!(writer, "{prefix}.{key}\t{value}\t{epoch}")
            .context("Failed to write metric value")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the graph definition header and JSON document.
pub fn write_meta<W: Write>(writer: &mut W, defs: &GraphDefinitions) -> Result<()> {
    let json = serde_json::to_string(defs)?;
    writeln!(writer, "{META_HEADER}")?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

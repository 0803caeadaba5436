//! Graph definitions advertised to the monitoring agent.
//!
//! The agent runs the plugin with `MACKEREL_AGENT_PLUGIN_META=1` to learn how
//! to chart the values. `#` in a graph name is a wildcard for the device label.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header line preceding the graph definition JSON
pub const META_HEADER: &str = "# mackerel-agent-plugin";

/// Environment variable set by the agent when it asks for graph definitions
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

/// Bytes per sector; the kernel always accounts I/O in 512-byte units.
pub const SECTOR_SIZE: f64 = 512.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "iops")]
    Iops,
    #[serde(rename = "bytes/sec")]
    BytesPerSecond,
}

/// One series of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetric {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub stacked: bool,
    /// The value is a running counter; the consumer charts its rate
    #[serde(default, skip_serializing_if = "is_false")]
    pub diff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<GraphMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinitions {
    pub graphs: BTreeMap<String, Graph>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn counter(name: &str, label: &str) -> GraphMetric {
    GraphMetric {
        name: name.to_string(),
        label: label.to_string(),
        stacked: false,
        diff: true,
        scale: None,
    }
}

fn title_case(prefix: &str) -> String {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the graph definitions for a metric key prefix.
pub fn graph_definitions(prefix: &str) -> GraphDefinitions {
    let label_prefix = title_case(prefix);
    let mut graphs = BTreeMap::new();

    graphs.insert(
        format!("{prefix}.request.#"),
        Graph {
            label: format!("{label_prefix} Requests (/sec)"),
            unit: Unit::Iops,
            metrics: vec![
                counter("reads", "read"),
                counter("writes", "write"),
                counter("discards", "discard"),
                counter("flushes", "flush"),
            ],
        },
    );

    graphs.insert(
        format!("{prefix}.merge.#"),
        Graph {
            label: format!("{label_prefix} Merge (/sec)"),
            unit: Unit::Float,
            metrics: vec![
                counter("reads", "read"),
                counter("writes", "write"),
                counter("discards", "discard"),
            ],
        },
    );

    let sectors = |name: &str, label: &str| GraphMetric {
        scale: Some(SECTOR_SIZE),
        ..counter(name, label)
    };
    graphs.insert(
        format!("{prefix}.sector.#"),
        Graph {
            label: format!("{label_prefix} Traffic"),
            unit: Unit::BytesPerSecond,
            metrics: vec![
                sectors("read", "read"),
                sectors("written", "write"),
                sectors("Discarded", "discard"),
            ],
        },
    );

    graphs.insert(
        format!("{prefix}.time.#"),
        Graph {
            label: format!("{label_prefix} Time (ms/sec)"),
            unit: Unit::Float,
            metrics: vec![
                counter("read", "read"),
                counter("write", "write"),
                counter("discard", "discard"),
                counter("flush", "flush"),
                counter("io", "io"),
                counter("ioWeighted", "io weighted"),
            ],
        },
    );

    graphs.insert(
        format!("{prefix}.inprogress.#"),
        Graph {
            label: format!("{label_prefix} IO in Progress"),
            unit: Unit::Integer,
            metrics: vec![GraphMetric {
                name: "io".to_string(),
                label: "io".to_string(),
                stacked: false,
                diff: false,
                scale: None,
            }],
        },
    );

    GraphDefinitions { graphs }
}

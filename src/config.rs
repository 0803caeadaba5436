//! Collector configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_KEY_PREFIX: &str = "disk";
pub const DEFAULT_DISKSTATS_PATH: &str = "/proc/diskstats";
pub const DEFAULT_SYS_BLOCK_PATH: &str = "/sys/block";

/// Settings for one plugin invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Prefix of every emitted metric key and graph name
    pub key_prefix: String,
    /// Drop metrics of devices classified as virtual (loop, dm, ram)
    pub ignore_virtual: bool,
    /// Kernel disk statistics file
    pub diskstats_path: PathBuf,
    /// Block device registry directory
    pub sys_block_path: PathBuf,
}

impl Config {
    /// Key prefix, falling back to the default when left empty.
    pub fn key_prefix(&self) -> &str {
        if self.key_prefix.is_empty() {
            DEFAULT_KEY_PREFIX
        } else {
            &self.key_prefix
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ignore_virtual: true,
            diskstats_path: PathBuf::from(DEFAULT_DISKSTATS_PATH),
            sys_block_path: PathBuf::from(DEFAULT_SYS_BLOCK_PATH),
        }
    }
}

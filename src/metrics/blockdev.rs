//! Physical/virtual classification of block devices under /sys/block.
//!
//! On Linux every entry of the block registry is a symlink into the device
//! tree. Loop, ram and device-mapper devices point into
//! `devices/virtual/block/`; disks backed by hardware point at their bus.

use super::source::SystemSource;
use crate::error::{CollectError, Result};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Subtree of the sysfs device tree holding virtual block devices.
pub const VIRTUAL_BLOCK_PREFIX: &str = "devices/virtual/block";

/// One entry of the block device registry directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDeviceEntry {
    /// Device name (e.g., "sda", "loop0")
    pub name: String,
    /// Full path of the entry, used to resolve the link
    pub path: PathBuf,
    pub is_symlink: bool,
}

/// List the block device registry, sorted by device name.
pub fn fetch_block_devices<S: SystemSource + ?Sized>(
    source: &S,
    dir: &Path,
) -> Result<Vec<BlockDeviceEntry>> {
    let mut entries = source
        .read_block_dir(dir)
        .map_err(|source| CollectError::SourceUnavailable {
            path: dir.to_path_buf(),
            source,
        })?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Build a map from device name to "is physical".
///
/// Every listed device is present in the map. Only symlinks pointing
/// outside the virtual block subtree are marked `true`; plain entries stay
/// `false`. A link that cannot be read aborts the whole classification.
pub fn classify<S: SystemSource + ?Sized>(
    entries: &[BlockDeviceEntry],
    source: &S,
) -> Result<HashMap<String, bool>> {
    let mut blocks = HashMap::with_capacity(entries.len());

    for entry in entries {
        blocks.insert(entry.name.clone(), false);

        if !entry.is_symlink {
            continue;
        }

        let target = source
            .read_link(&entry.path)
            .map_err(|source| CollectError::SymlinkResolution {
                path: entry.path.clone(),
                source,
            })?;

        if is_virtual_target(&target) {
            debug!(device = %entry.name, target = %target.display(), "virtual block device");
            continue;
        }

        blocks.insert(entry.name.clone(), true);
    }

    Ok(blocks)
}

/// Whether a registry link target lies in the virtual block subtree.
///
/// Leading `..`, `.` and root components are dropped, as is a leading `sys`
/// component, so relative and absolute targets compare alike.
pub fn is_virtual_target(target: &Path) -> bool {
    let mut components = target
        .components()
        .skip_while(|c| matches!(c, Component::ParentDir | Component::CurDir | Component::RootDir))
        .peekable();

    if components.peek() == Some(&Component::Normal(OsStr::new("sys"))) {
        components.next();
    }

    let rest: PathBuf = components.collect();
    // Path::starts_with compares whole components, so "devices/virtual/blockx" is not a match
    rest.starts_with(VIRTUAL_BLOCK_PREFIX) && rest.as_path() != Path::new(VIRTUAL_BLOCK_PREFIX)
}

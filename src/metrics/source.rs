//! Filesystem access used by the disk collector.
//!
//! The `SystemSource` trait lets the collector read the real `/proc` and
//! `/sys` trees on a host, or an in-memory fixture in tests.

use super::blockdev::BlockDeviceEntry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of the files the collector consumes.
pub trait SystemSource {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists a block device registry directory without following symlinks.
    fn read_block_dir(&self, path: &Path) -> io::Result<Vec<BlockDeviceEntry>>;

    /// Returns the target of a symbolic link, unresolved.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Host filesystem, delegating to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl HostFs {
    pub fn new() -> Self {
        Self
    }
}

impl SystemSource for HostFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_block_dir(&self, path: &Path) -> io::Result<Vec<BlockDeviceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // DirEntry::file_type does not traverse symlinks
            let is_symlink = entry.file_type()?.is_symlink();
            entries.push(BlockDeviceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_symlink,
            });
        }
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }
}

//! Disk I/O metrics collection from /proc/diskstats.
//!
//! Ties the tokenizer, the block device classifier and the metric catalogue
//! together. A collection either yields the metrics of every included device
//! or fails as a whole.

use super::blockdev::{classify, fetch_block_devices, BlockDeviceEntry};
use super::diskstats::tokenize;
use super::normalize::{MetricCatalogue, MetricMapping};
use super::source::{HostFs, SystemSource};
use crate::config::Config;
use crate::error::{CollectError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Build the metric mapping for one diskstats snapshot.
///
/// With `ignore_virtual` set, `entries` are classified and rows of devices
/// known to be virtual are skipped. Devices missing from the listing are
/// always kept.
pub fn collect_metrics<S: SystemSource + ?Sized>(
    catalogue: &MetricCatalogue,
    source: &S,
    diskstats: &str,
    entries: &[BlockDeviceEntry],
    ignore_virtual: bool,
) -> Result<MetricMapping> {
    let blocks = if ignore_virtual {
        classify(entries, source)?
    } else {
        HashMap::new()
    };

    let mut metrics = MetricMapping::new();
    for row in tokenize(diskstats) {
        let device = match row.device() {
            Some(device) if !row.counters().is_empty() => device,
            _ => {
                return Err(CollectError::ShortRow {
                    line: row.to_line(),
                })
            }
        };

        if blocks.get(device) == Some(&false) {
            debug!(device, "skipping virtual device");
            continue;
        }

        let label = catalogue.sanitize_device_name(device);
        catalogue.normalize(&label, &row, &mut metrics)?;
    }

    Ok(metrics)
}

/// Disk metrics collector bound to a filesystem source
pub struct DiskCollector<'a, S = HostFs> {
    catalogue: &'a MetricCatalogue,
    source: S,
    ignore_virtual: bool,
    diskstats_path: PathBuf,
    sys_block_path: PathBuf,
}

impl<'a> DiskCollector<'a, HostFs> {
    pub fn new(catalogue: &'a MetricCatalogue, config: &Config) -> Self {
        Self::with_source(catalogue, config, HostFs::new())
    }
}

impl<'a, S: SystemSource> DiskCollector<'a, S> {
    pub fn with_source(catalogue: &'a MetricCatalogue, config: &Config, source: S) -> Self {
        Self {
            catalogue,
            source,
            ignore_virtual: config.ignore_virtual,
            diskstats_path: config.diskstats_path.clone(),
            sys_block_path: config.sys_block_path.clone(),
        }
    }

    /// Collect current disk metrics
    pub fn collect(&self) -> Result<MetricMapping> {
        let diskstats = self
            .source
            .read_to_string(&self.diskstats_path)
            .map_err(|source| CollectError::SourceUnavailable {
                path: self.diskstats_path.clone(),
                source,
            })?;

        let entries = if self.ignore_virtual {
            fetch_block_devices(&self.source, &self.sys_block_path)?
        } else {
            Vec::new()
        };

        let metrics = collect_metrics(
            self.catalogue,
            &self.source,
            &diskstats,
            &entries,
            self.ignore_virtual,
        )?;

        if metrics.is_empty() {
            warn!(path = %self.diskstats_path.display(), "no disk metrics collected");
        } else {
            debug!(count = metrics.len(), "collected disk metrics");
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::source::mock::MockFs;

    const DISKSTATS: &str = "\
   7       0 loop0 58 0 2086 12 0 0 0 0 0 24 12 0 0 0 0
 253       0 vda 62695 0 2880751 26352 1383415 166185 10725792 396176 0 25204 301208 0 0 0 0
 253       1 vda1 62500 0 2870000 26300 1383000 166185 10725000 396000 0 25100 301000 0 0 0 0
 252       0 dm-0 300 0 2400 60 0 0 0 0 0 60 60 0 0 0 0
";

    fn host() -> MockFs {
        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", DISKSTATS);
        fs.add_link("/sys/block", "loop0", "../devices/virtual/block/loop0");
        fs.add_link("/sys/block", "dm-0", "../devices/virtual/block/dm-0");
        fs.add_link(
            "/sys/block",
            "vda",
            "../devices/pci0000:00/0000:00:05.0/virtio2/block/vda",
        );
        fs
    }

    fn devices(metrics: &MetricMapping) -> Vec<String> {
        let mut devices: Vec<String> = metrics
            .keys()
            .filter_map(|k| k.split('.').nth(1))
            .map(str::to_string)
            .collect();
        devices.sort();
        devices.dedup();
        devices
    }

    #[test]
    fn test_collect_skips_virtual_devices() {
        let catalogue = MetricCatalogue::new();
        let collector = DiskCollector::with_source(&catalogue, &Config::default(), host());
        let metrics = collector.collect().unwrap();

        // vda1 is a partition: absent from /sys/block, so unknown and kept
        assert_eq!(devices(&metrics), vec!["vda", "vda1"]);
        assert_eq!(metrics.len(), 30);
        assert_eq!(metrics["request.vda.reads"], 62695.0 / 60.0);
        assert_eq!(metrics["inprogress.vda.io"], 0.0);
        assert_eq!(metrics["time.vda.ioWeighted"], 301208.0 / 60.0);
        assert!(!metrics.keys().any(|k| k.contains(".loop0.")));
        assert!(!metrics.keys().any(|k| k.contains(".dm-0.")));
    }

    #[test]
    fn test_collect_keeps_everything_without_filter() {
        let catalogue = MetricCatalogue::new();
        let config = Config {
            ignore_virtual: false,
            ..Config::default()
        };
        // no /sys/block listing at all: the directory must not be read
        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", DISKSTATS);

        let metrics = DiskCollector::with_source(&catalogue, &config, fs)
            .collect()
            .unwrap();
        assert_eq!(devices(&metrics), vec!["dm-0", "loop0", "vda", "vda1"]);
        assert_eq!(metrics.len(), 60);
    }

    #[test]
    fn test_collect_fails_without_partial_results() {
        let catalogue = MetricCatalogue::new();
        let text = "\
 253       0 vda 62695 0 2880751 26352 1383415 166185 10725792 396176 0 25204 301208
 253      16 vdb 72583 27934 x14612 11784 36796 368511 3242456 23704 0 25272 35452
";
        let result = collect_metrics(&catalogue, &MockFs::new(), text, &[], false);

        match result {
            Err(CollectError::MalformedRow { device, field, token }) => {
                assert_eq!(device, "vdb");
                assert_eq!(field, "sector.read");
                assert_eq!(token, "x14612");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_rejects_row_without_counters() {
        let catalogue = MetricCatalogue::new();
        let err = collect_metrics(&catalogue, &MockFs::new(), "8 0 sda\n", &[], false)
            .unwrap_err();
        assert!(matches!(err, CollectError::ShortRow { ref line } if line == "8 0 sda"));
    }

    #[test]
    fn test_collect_sanitizes_labels() {
        let catalogue = MetricCatalogue::new();
        let text = "104 0 cciss!c0d0 1 2 3 4 5 6 7 8 9 10 11\n";
        let metrics = collect_metrics(&catalogue, &MockFs::new(), text, &[], true).unwrap();
        assert!(metrics.contains_key("request.ccissc0d0.reads"));
        assert_eq!(metrics.len(), 11);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let catalogue = MetricCatalogue::new();
        let collector = DiskCollector::with_source(&catalogue, &Config::default(), host());
        let first = collector.collect().unwrap();
        let second = collector.collect().unwrap();

        assert_eq!(first.len(), second.len());
        for (key, value) in &first {
            assert_eq!(value.to_bits(), second[key].to_bits(), "{key}");
        }
    }

    #[test]
    fn test_collect_reports_missing_sources() {
        let catalogue = MetricCatalogue::new();

        let err = DiskCollector::with_source(&catalogue, &Config::default(), MockFs::new())
            .collect()
            .unwrap_err();
        assert!(
            matches!(err, CollectError::SourceUnavailable { ref path, .. } if path == &PathBuf::from("/proc/diskstats"))
        );

        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", DISKSTATS);
        let err = DiskCollector::with_source(&catalogue, &Config::default(), fs)
            .collect()
            .unwrap_err();
        assert!(
            matches!(err, CollectError::SourceUnavailable { ref path, .. } if path == &PathBuf::from("/sys/block"))
        );
    }

    #[test]
    fn test_collect_fails_on_unresolvable_link() {
        let catalogue = MetricCatalogue::new();
        let mut fs = host();
        fs.add_dangling_link("/sys/block", "sr0");

        let err = DiskCollector::with_source(&catalogue, &Config::default(), fs)
            .collect()
            .unwrap_err();
        assert!(err.to_string().contains("/sys/block/sr0"));
    }

    #[test]
    fn test_collect_from_host_tree() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::TempDir::new().unwrap();
        let diskstats = tmp.path().join("diskstats");
        let block = tmp.path().join("block");
        std::fs::write(&diskstats, DISKSTATS).unwrap();
        std::fs::create_dir(&block).unwrap();
        symlink("../devices/virtual/block/loop0", block.join("loop0")).unwrap();
        symlink("../devices/virtual/block/dm-0", block.join("dm-0")).unwrap();
        symlink("../devices/pci0000:00/0000:00:05.0/virtio2/block/vda", block.join("vda")).unwrap();

        let catalogue = MetricCatalogue::new();
        let config = Config {
            diskstats_path: diskstats,
            sys_block_path: block,
            ..Config::default()
        };
        let metrics = DiskCollector::new(&catalogue, &config).collect().unwrap();
        assert_eq!(devices(&metrics), vec!["vda", "vda1"]);
    }
}

//! Disk statistics collection, classification and normalization.

pub mod blockdev;
pub mod disk;
pub mod diskstats;
pub mod normalize;
pub mod source;

pub use blockdev::BlockDeviceEntry;
pub use disk::{collect_metrics, DiskCollector};
pub use diskstats::DiskstatsRow;
pub use normalize::{MetricCatalogue, MetricMapping};
pub use source::{HostFs, SystemSource};

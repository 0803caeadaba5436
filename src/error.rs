//! Errors that abort a collection cycle.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting disk metrics.
///
/// Every variant is fatal for the current cycle: no partial metric set is
/// ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("cannot read from {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse value {token:?} for {field} of device {device}")]
    MalformedRow {
        device: String,
        field: &'static str,
        token: String,
    },

    #[error("diskstats row has no counters: {line:?}")]
    ShortRow { line: String },

    #[error("cannot resolve block device link {}: {source}", path.display())]
    SymlinkResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CollectError>;

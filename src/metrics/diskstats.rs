//! Tokenizing of /proc/diskstats content.
//!
//! ```text
//! $ cat /proc/diskstats
//!  253       0 vda 1535048 279 41601294 520508 73249233 7260487 540931528 10616000 0 5871704 11113052
//!  253       1 vda1 1534559 279 41576784 520420 46025748 7260487 540931528 8670868 0 3948708 9173652
//! ```

/// Number of identity fields (major, minor, device name) before the counters.
pub const IDENTITY_FIELDS: usize = 3;

/// One line of /proc/diskstats, split into whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskstatsRow {
    tokens: Vec<String>,
}

impl DiskstatsRow {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn major(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn minor(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }

    /// Device name as reported by the kernel (e.g., "sda", "nvme0n1p1")
    pub fn device(&self) -> Option<&str> {
        self.tokens.get(2).map(String::as_str)
    }

    /// Counter tokens following the identity fields
    pub fn counters(&self) -> &[String] {
        self.tokens.get(IDENTITY_FIELDS..).unwrap_or(&[])
    }

    /// Reassembles the row with single spaces, for diagnostics.
    pub fn to_line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Split raw diskstats text into rows, in file order.
///
/// Blank lines (including the trailing newline artifact) produce no row.
pub fn tokenize(text: &str) -> Vec<DiskstatsRow> {
    text.split('\n')
        .filter_map(|line| {
            let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            match fields.first() {
                Some(first) if !first.is_empty() => Some(DiskstatsRow::new(fields)),
                _ => None,
            }
        })
        .collect()
}

//! Statistics over groups and snapshots.
//!
//! Used by the text presenter and the JSON report.

use super::coalesce::{GroupRef, Grouped};

/// Smallest and largest elapsed minutes within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinuteRange {
    pub min: u32,
    pub max: u32,
}

/// Group and goroutine counts of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotTotals {
    pub groups: usize,
    pub goroutines: usize,
}

impl SnapshotTotals {
    pub fn is_empty(&self) -> bool {
        self.groups == 0
    }
}

impl GroupRef<'_> {
    /// Minute range over all members
    pub fn minute_range(&self) -> MinuteRange {
        self.goroutines()
            .map(|g| g.minutes)
            .fold(None, |range: Option<MinuteRange>, m| {
                Some(match range {
                    None => MinuteRange { min: m, max: m },
                    Some(r) => MinuteRange {
                        min: r.min.min(m),
                        max: r.max.max(m),
                    },
                })
            })
            .unwrap_or_default()
    }
}

impl Grouped {
    /// Count groups and members
    pub fn totals(&self) -> SnapshotTotals {
        SnapshotTotals {
            groups: self.len(),
            goroutines: self.groups.iter().map(|g| g.members.len()).sum(),
        }
    }
}

//! Grouping of goroutines and the snapshot query algebra.
//!
//! This module transforms a parsed dump into:
//! - Groups of equivalent goroutines (exact or rough key)
//! - Derived snapshots (top, filter, drop, isolate)
//! - Per-group minute statistics

pub mod coalesce;
pub mod metrics;
pub mod query;
pub mod signature;

// Re-export main types and functions
pub use coalesce::{coalesce, GroupRef, Grouped};
pub use metrics::{MinuteRange, SnapshotTotals};
pub use signature::Ends;

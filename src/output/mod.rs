//! Output of snapshots.
//!
//! This module handles:
//! - Text summaries and stack rendering for the interactive session
//! - JSON reports

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{read_report, to_report, write_report, GroupReport, Report};
pub use text::{render, summary};

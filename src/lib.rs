//! gr-triage
//!
//! Collapse near-duplicate goroutines of a Go runtime dump into groups and
//! narrow them down interactively to find the cause of a hang or leak.
//!
//! This crate provides the core implementation for the `gr` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install gr-triage
//! gr --help
//! gr -s goroutines.txt
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

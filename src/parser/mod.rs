//! Goroutine dump parsing and the record model.
//!
//! This module handles:
//! - Splitting a dump into goroutine blocks
//! - Parsing headers, frames and creator call sites
//! - Fatal or lenient handling of malformed blocks

pub mod goroutine_dump;
pub mod schema;

// Re-export main types
pub use goroutine_dump::{parse, CorruptionPolicy, ParseOutcome, SkippedBlock};
pub use schema::{CallSite, Dump, Frame, Goroutine, Location};

//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod analyze;
pub mod repl;

// Re-export main command functions
pub use analyze::{execute_analyze, load_dump, validate_args, AnalyzeArgs};
pub use repl::{run, Command, Reply, ReplState, Session};

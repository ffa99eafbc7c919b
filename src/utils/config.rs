//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Prompt written before each interactive command
pub const PROMPT: &str = "> ";

/// Text rendered in place of `file:line` for frames without a known location
pub const UNAVAILABLE_PLACEHOLDER: &str = "<unavailable>";

// Location placeholders the runtime is known to print
pub const UNAVAILABLE_MARKERS: &[&str] = &["<not available>", "<unavailable>"];

/// Read buffer size for dump files
pub const READ_BUFFER_SIZE: usize = 64 << 10;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

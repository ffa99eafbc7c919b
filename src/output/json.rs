//! JSON report output.
//!
//! Writes a snapshot as a pretty-printed JSON report for batch use.

use crate::aggregator::Grouped;
use crate::parser::schema::CallSite;
use crate::utils::config::{SCHEMA_VERSION, UNAVAILABLE_PLACEHOLDER};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Top-level report document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    /// Report schema version
    pub version: String,

    /// Dump the report was built from
    pub source: String,

    /// Groups keyed by full signature
    pub exact: bool,

    pub total_goroutines: usize,

    pub groups: Vec<GroupReport>,

    /// ISO 8601 timestamp
    pub generated_at: String,
}

/// One group of the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupReport {
    pub size: usize,
    pub minutes_min: u32,
    pub minutes_max: u32,

    /// Status of the representative goroutine
    pub status: String,

    /// Member goroutine ids in parse order
    pub ids: Vec<u64>,

    /// `name file:line` per frame of the representative, innermost first
    pub stack: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Build a report from a snapshot
///
/// **Public** - used by the analyze command before writing
pub fn to_report(grouped: &Grouped, source: impl Into<String>) -> Report {
    let groups: Vec<GroupReport> = grouped
        .groups()
        .map(|group| {
            let range = group.minute_range();
            let rep = group.representative();
            GroupReport {
                size: group.len(),
                minutes_min: range.min,
                minutes_max: range.max,
                status: rep.status.clone(),
                ids: group.goroutines().map(|g| g.id).collect(),
                stack: rep.frames().iter().map(|f| describe(&f.call)).collect(),
                created_by: rep.created_by.as_ref().map(describe),
            }
        })
        .collect();

    Report {
        version: SCHEMA_VERSION.to_string(),
        source: source.into(),
        exact: grouped.is_exact(),
        total_goroutines: grouped.totals().goroutines,
        groups,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn describe(call: &CallSite) -> String {
    match &call.location {
        Some(loc) => format!("{} {}:{}", call.name, loc.file, loc.line),
        None => format!("{} {}", call.name, UNAVAILABLE_PLACEHOLDER),
    }
}

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!("Report written ({} groups)", report.groups.len());

    Ok(())
}

/// Read a report back from a JSON file
///
/// **Public** - useful for validation and testing
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: Report =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    Ok(report)
}

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the dump file
//! 2. Parses it under the selected corruption policy
//! 3. Coalesces goroutines into groups
//! 4. Writes a JSON report, or starts the interactive session

use super::repl::{run, Session};
use crate::aggregator::coalesce;
use crate::output::{summary, to_report, write_report};
use crate::parser::{parse, CorruptionPolicy, ParseOutcome};
use crate::utils::config::READ_BUFFER_SIZE;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Goroutine dump to read
    pub dump_path: PathBuf,

    /// Group by full signature instead of ends
    pub exact: bool,

    /// Fatal or lenient handling of malformed blocks
    pub policy: CorruptionPolicy,

    /// Write a JSON report here instead of starting the session
    pub report: Option<PathBuf>,
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.dump_path.as_os_str().is_empty() {
        anyhow::bail!("Dump path cannot be empty");
    }

    if let Some(report) = &args.report {
        if report == &args.dump_path {
            anyhow::bail!("Report path would overwrite the dump: {}", report.display());
        }
    }

    Ok(())
}

/// Read and parse a dump file
///
/// **Public** - shared by the session and batch modes
///
/// # Errors
/// * The file cannot be opened or read
/// * A malformed block under [`CorruptionPolicy::Fatal`]
pub fn load_dump(path: &Path, policy: CorruptionPolicy) -> Result<ParseOutcome> {
    let file = File::open(path).with_context(|| format!("unable to open {}", path.display()))?;

    let mut bytes = Vec::new();
    BufReader::with_capacity(READ_BUFFER_SIZE, file)
        .read_to_end(&mut bytes)
        .with_context(|| format!("unable to read {}", path.display()))?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let outcome =
        parse(&bytes, policy).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(outcome)
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/3: Parsing dump: {}", args.dump_path.display());
    let outcome = load_dump(&args.dump_path, args.policy)?;

    if !outcome.skipped.is_empty() {
        warn!("Skipped {} malformed blocks", outcome.skipped.len());
    }
    if outcome.dump.is_empty() {
        warn!("No goroutines found in {}", args.dump_path.display());
    }

    info!("Step 2/3: Coalescing {} goroutines...", outcome.dump.len());
    let base = coalesce(Rc::new(outcome.dump), args.exact);

    info!("Ready in {:.2}s", start_time.elapsed().as_secs_f64());

    if let Some(report_path) = &args.report {
        info!("Step 3/3: Writing report...");
        let report = to_report(&base, args.dump_path.display().to_string());
        write_report(&report, report_path).context("Failed to write report JSON")?;
        println!("{}", summary(&base));
        return Ok(());
    }

    info!("Step 3/3: Starting interactive session (h for help)");
    println!("{}", summary(&base));

    let mut session = Session::new(base);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&mut session, stdin.lock(), stdout.lock()).context("interactive session failed")?;

    Ok(())
}

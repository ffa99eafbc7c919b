//! gr CLI
//!
//! Groups the goroutines of a Go runtime dump and lets the operator
//! filter, rank and drop groups interactively.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use env_logger::Env;
use std::path::PathBuf;

use gr_triage::commands::{execute_analyze, validate_args, AnalyzeArgs};
use gr_triage::parser::CorruptionPolicy;
use gr_triage::utils::config::DEFAULT_LOG_LEVEL;

/// gr - coalesce and filter goroutine dumps
#[derive(Parser, Debug)]
#[command(name = "gr")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Coalesce goroutines strictly (identical stacks only)
    #[arg(short, long)]
    strict: bool,

    /// Skip malformed goroutine blocks instead of failing
    #[arg(long)]
    lenient: bool,

    /// Write the initial grouping as a JSON report and exit
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Stack dump file
    dumps: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if cli.dumps.len() != 1 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let args = AnalyzeArgs {
        dump_path: cli.dumps[0].clone(),
        exact: cli.strict,
        policy: if cli.lenient {
            CorruptionPolicy::Lenient
        } else {
            CorruptionPolicy::Fatal
        },
        report: cli.report,
    };

    validate_args(&args)?;
    execute_analyze(args)?;

    Ok(())
}

//! Offline batch linter: checks an authored event file without touching
//! any database. Exit code 1 means the file would be rejected by ingest.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use ghostroute_common::{validate_batch, Strictness};

#[derive(Parser)]
#[command(name = "validate-events")]
#[command(about = "Validate an authored event batch file")]
struct Cli {
    /// Path to a JSON file containing an array of events
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let batch: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", cli.file.display()))?;

    let report = validate_batch(&batch, Strictness::Authored);

    println!("{} events", report.event_count);
    if !report.action_counts.is_empty() {
        println!("action distribution:");
        for (action, count) in &report.action_counts {
            println!("  {action:<16} {count}");
        }
    }

    if report.is_ok() {
        println!("OK");
        Ok(true)
    } else {
        println!("{} violations:", report.violations.len());
        for violation in &report.violations {
            println!("  {violation}");
        }
        Ok(false)
    }
}

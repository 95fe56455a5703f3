//! Authored batch loader: validates a JSON event file and commits it to the
//! store in a single transaction. Strictly transactional, no degraded
//! fallback; a failed run leaves the store exactly as it was.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ghostroute_store::{ingest_batch, EventStore, StoreError};

#[derive(Parser)]
#[command(name = "ingest-events")]
#[command(about = "Ingest an authored event batch into the store")]
struct Cli {
    /// Path to a JSON file containing an array of events
    #[arg(short, long)]
    file: PathBuf,

    /// Chapter partition to ingest into (omit for the chapterless partition)
    #[arg(short, long)]
    chapter: Option<i32>,

    /// Empty the target partition before inserting
    #[arg(long)]
    replace: bool,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("ghostroute=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let batch: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", cli.file.display()))?;
    if batch.is_empty() {
        bail!("{} contains no events", cli.file.display());
    }

    let store = EventStore::connect(&cli.database_url).await?;
    store.ensure_schema().await?;

    match ingest_batch(&store, &batch, cli.chapter, cli.replace).await {
        Ok(outcome) => {
            info!(
                inserted = outcome.inserted,
                deleted = outcome.deleted,
                chapter = ?cli.chapter,
                "batch committed"
            );
            println!(
                "committed {} events (replaced {})",
                outcome.inserted, outcome.deleted
            );
        }
        Err(StoreError::Validation(report)) => {
            eprintln!("batch rejected, nothing written:");
            for violation in &report.violations {
                eprintln!("  {violation}");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    store.close().await;
    Ok(())
}

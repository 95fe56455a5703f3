//! Apply the `.sql` migration scripts in a directory, in filename order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghostroute_store::{EventStore, MigrationRunner};

#[derive(Parser)]
#[command(name = "run-migrations")]
#[command(about = "Apply schema migration scripts")]
struct Cli {
    /// Directory containing .sql migration scripts
    #[arg(short, long, default_value = "./migrations")]
    dir: PathBuf,

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
    let store = EventStore::connect(&cli.database_url).await?;

    let summary = MigrationRunner::new(&cli.dir).run(store.pool()).await?;
    println!(
        "{} applied, {} failed",
        summary.applied.len(),
        summary.failed.len()
    );
    for (name, error) in &summary.failed {
        eprintln!("  {name}: {error}");
    }

    store.close().await;
    if summary.failed.is_empty() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

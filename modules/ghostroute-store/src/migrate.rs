//! Filesystem-discovered schema migrations.
//!
//! Scripts are plain `.sql` files applied in lexicographic filename order
//! (zero-padded prefixes make that chronological). There is no applied-
//! version table: every script must be internally idempotent and is
//! attempted exactly once per invocation. A failing script is logged and
//! skipped so an unrelated structural change is never blocked by it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::{error, info};

pub struct MigrationRunner {
    dir: PathBuf,
}

/// Per-script outcomes of one runner invocation.
#[derive(Debug, Default)]
pub struct MigrationSummary {
    pub applied: Vec<String>,
    /// (script name, error) for each failure. Never fatal to the run.
    pub failed: Vec<(String, String)>,
}

impl MigrationRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// All `.sql` scripts in the directory, sorted by filename.
    /// A missing directory means there is nothing to do.
    pub fn discover(&self) -> io::Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut scripts: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
            .collect();
        scripts.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
        Ok(scripts)
    }

    /// Apply every discovered script once, in order, isolating failures.
    pub async fn run(&self, pool: &PgPool) -> io::Result<MigrationSummary> {
        let scripts = self.discover()?;
        if scripts.is_empty() {
            info!(dir = %self.dir.display(), "no migration scripts found");
            return Ok(MigrationSummary::default());
        }

        let mut summary = MigrationSummary::default();
        for script in scripts {
            let name = script_name(&script);
            // An unreadable script is its own failure; later scripts still run.
            let sql = match fs::read_to_string(&script) {
                Ok(sql) => sql,
                Err(e) => {
                    error!(script = %name, error = %e, "migration unreadable, continuing");
                    summary.failed.push((name, e.to_string()));
                    continue;
                }
            };
            match sqlx::raw_sql(&sql).execute(pool).await {
                Ok(_) => {
                    info!(script = %name, "migration applied");
                    summary.applied.push(name);
                }
                Err(e) => {
                    error!(script = %name, error = %e, "migration failed, continuing");
                    summary.failed.push((name, e.to_string()));
                }
            }
        }
        Ok(summary)
    }
}

fn script_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

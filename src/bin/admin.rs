//! CLI administration tool for url-shortener.
//!
//! Moves records between snapshot files and PostgreSQL and performs database
//! checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Summarize a snapshot file
//! cargo run --bin admin -- snapshot inspect urls.jsonl
//!
//! # Dump PostgreSQL into a snapshot file
//! cargo run --bin admin -- snapshot export urls.jsonl
//!
//! # Load a snapshot file into PostgreSQL
//! cargo run --bin admin -- snapshot import urls.jsonl --yes
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for `export`, `import` and `db`): PostgreSQL connection string

use url_shortener::domain::repositories::{BulkUrlRepository, UrlRepository};
use url_shortener::infrastructure::persistence::PgUrlRepository;
use url_shortener::infrastructure::snapshot::{FileSnapshot, SnapshotRecord};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI tool for managing url-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Work with snapshot files
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Snapshot subcommands.
#[derive(Subcommand)]
enum SnapshotAction {
    /// Show what a snapshot file contains
    Inspect {
        /// Snapshot file
        file: PathBuf,
    },

    /// Write every PostgreSQL record to a snapshot file
    Export {
        /// Target snapshot file
        file: PathBuf,
    },

    /// Load a snapshot file into PostgreSQL
    Import {
        /// Source snapshot file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot {
            action: SnapshotAction::Inspect { file },
        } => inspect_snapshot(FileSnapshot::new(file)).await?,
        Commands::Snapshot {
            action: SnapshotAction::Export { file },
        } => export_snapshot(connect().await?, FileSnapshot::new(file)).await?,
        Commands::Snapshot {
            action: SnapshotAction::Import { file, yes },
        } => import_snapshot(connect().await?, FileSnapshot::new(file), yes).await?,
        Commands::Db {
            action: DbAction::Check,
        } => check_database(connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgUrlRepository> {
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_DSN"))
        .context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(PgUrlRepository::new(Arc::new(pool)))
}

/// Prints record counts of a snapshot file.
///
/// # Output Format
///
/// ```text
/// 📄 Snapshot urls.jsonl
///
///   Records:  120
///   Deleted:  7
///   Owners:   12
///   Last id:  131
/// ```
async fn inspect_snapshot(snapshot: FileSnapshot) -> Result<()> {
    println!(
        "{}",
        format!("📄 Snapshot {}", snapshot.path().display())
            .bright_blue()
            .bold()
    );
    println!();

    let records = snapshot.read_records().await?;

    if records.is_empty() {
        println!("{}", "  Snapshot is empty or missing".yellow());
        return Ok(());
    }

    let summary = Summary::of(&records);

    println!(
        "  Records:  {}",
        summary.records.to_string().bright_green().bold()
    );
    println!("  Deleted:  {}", summary.deleted.to_string().bright_black());
    println!("  Owners:   {}", summary.owners.to_string().cyan());
    println!("  Last id:  {}", summary.last_id.to_string().bright_white());
    println!();

    Ok(())
}

async fn export_snapshot(repo: PgUrlRepository, snapshot: FileSnapshot) -> Result<()> {
    println!("{}", "📤 Export snapshot".bright_blue().bold());
    println!();

    let saved = snapshot
        .save_from(&repo)
        .await
        .context("Failed to export records")?;

    println!(
        "{}",
        format!("✅ Exported {saved} records to {}", snapshot.path().display())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

/// Loads a snapshot into PostgreSQL after confirmation.
///
/// Records keep their ids; rows with the same id are overwritten.
async fn import_snapshot(
    repo: PgUrlRepository,
    snapshot: FileSnapshot,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "📥 Import snapshot".bright_blue().bold());
    println!();

    let records = snapshot.read_records().await?;
    if records.is_empty() {
        println!("{}", "  Nothing to import".yellow());
        return Ok(());
    }

    let summary = Summary::of(&records);
    let existing = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!("  File:        {}", snapshot.path().display().to_string().cyan());
    println!("  Records:     {}", summary.records.to_string().bright_white());
    println!("  In database: {}", existing.to_string().bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Import these records? Rows with the same id are overwritten")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let imported = repo
        .import_all(records.into_iter().map(Into::into).collect())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to import records: {}", e))?;

    println!();
    println!(
        "{}",
        format!("✅ Imported {imported} records").green().bold()
    );
    println!();

    Ok(())
}

async fn check_database(repo: PgUrlRepository) -> Result<()> {
    println!("{}", "🔍 Checking database connection...".bright_blue());

    repo.ping()
        .await
        .map_err(|e| anyhow::anyhow!("Database is unreachable: {}", e))?;

    let count = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!("{}", "✅ Database connection OK".green().bold());
    println!("  Records: {}", count.to_string().bright_green().bold());

    Ok(())
}

struct Summary {
    records: usize,
    deleted: usize,
    owners: usize,
    last_id: i64,
}

impl Summary {
    fn of(records: &[SnapshotRecord]) -> Self {
        let owners: HashSet<i64> = records.iter().map(|r| r.owner_id).collect();

        Self {
            records: records.len(),
            deleted: records.iter().filter(|r| r.deleted).count(),
            owners: owners.len(),
            last_id: records.iter().map(|r| r.id).max().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, owner_id: i64, deleted: bool) -> SnapshotRecord {
        SnapshotRecord {
            id,
            owner_id,
            original_url: format!("https://example.com/{id}"),
            deleted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record(3, 1, false),
            record(12, 2, true),
            record(7, 1, true),
            record(8, 5, false),
        ];

        let summary = Summary::of(&records);

        assert_eq!(summary.records, 4);
        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.owners, 3);
        assert_eq!(summary.last_id, 12);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::of(&[]);

        assert_eq!(summary.records, 0);
        assert_eq!(summary.owners, 0);
        assert_eq!(summary.last_id, 0);
    }
}

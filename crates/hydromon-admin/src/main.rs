use std::env;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hydromon_core::config::DatabaseConfig;
use hydromon_core::db::{self, DbPool};
use hydromon_core::{purge, seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hydromon administrative tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the coded-value domains into the database
    DbSeed(DbSeedArgs),
    /// Plan (and optionally apply) deletion of loaded monitoring content
    Purge(PurgeArgs),
}

#[derive(Args, Debug, Default)]
struct DbSeedArgs {
    /// Skip running embedded database migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
}

#[derive(Args, Debug, Default)]
struct PurgeArgs {
    /// Apply deletions instead of running in dry-run mode
    #[arg(long)]
    apply: bool,
    /// Leave the coded-value domains in place
    #[arg(long)]
    keep_domains: bool,
    /// Skip running migrations before inspecting the database
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::DbSeed(args) => handle_db_seed(args).await,
        Command::Purge(args) => handle_purge(args).await,
    }
}

async fn connect_pool() -> Result<DbPool> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("HYDROMON_DATABASE_URL"))
        .context("DATABASE_URL (or HYDROMON_DATABASE_URL) must be set")?;

    db::connect(&database_url, &DatabaseConfig::default()).await
}

async fn handle_db_seed(args: DbSeedArgs) -> Result<()> {
    let pool = connect_pool().await?;

    if args.skip_migrations {
        info!("Skipping migrations at user request");
    } else {
        db::run_migrations(&pool).await?;
    }

    seed::run(&pool).await?;

    Ok(())
}

async fn handle_purge(args: PurgeArgs) -> Result<()> {
    let pool = connect_pool().await?;

    if !args.skip_migrations {
        db::run_migrations(&pool).await?;
    }

    let plan = purge::plan_purge(&pool, args.keep_domains).await?;

    if plan.is_empty() {
        println!("Nothing to purge. All monitoring tables are empty.");
        return Ok(());
    }

    println!("Found {} rows to delete:", plan.total_rows());
    for entry in plan.entries.iter().filter(|entry| entry.rows > 0) {
        println!("  {}: {} rows", entry.table, entry.rows);
    }

    if args.apply {
        let deleted = purge::apply_purge(&pool, &plan).await?;
        println!("Deleted {deleted} rows.");
    } else {
        println!("Run again with --apply to delete these rows.");
    }

    Ok(())
}

mod logging;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use hydromon_core::config::{load_config, HydroConfig};
use hydromon_core::error::{EnvironmentError, LoadError};
use hydromon_core::loader::{load_data, LoadOptions, LoadSources};
use hydromon_core::parser::{
    MeasuringPointFeed, MonitoringFeed, PhotoIndexFeed, SourceFeed, StationsFeed,
};
use hydromon_core::photos::{load_photos, PhotoOptions};
use hydromon_core::store::MemoryStore;
use hydromon_core::{db, environment};
use tracing::{error, info};

use crate::logging::LogLevel;

const ENVIRONMENT_FAILURE: u8 = 255;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hydrologic monitoring data loaders", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Target database URL (defaults to DATABASE_URL or HYDROMON_DATABASE_URL)
    #[arg(long, global = true)]
    server: Option<String>,
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,
    /// Also write the log to this file; it must not already exist
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Log running metrics every N rows (0 disables)
    #[arg(long, default_value_t = 0, global = true)]
    feedback: u32,
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the embedded schema migrations to the target database
    Migrate,
    /// Load locations, loggers, sensors and measuring points
    LoadData(LoadDataArgs),
    /// Attach indexed photos to locations and measuring points
    LoadPhotos(LoadPhotosArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::LoadData(_) => "load-data",
            Command::LoadPhotos(_) => "load-photos",
        }
    }
}

#[derive(Args, Debug)]
struct LoadDataArgs {
    /// Stations CSV (LocationIdentifier, X, Y)
    stations: PathBuf,
    /// Monitoring sheet CSV
    monitoring: PathBuf,
    /// Measuring points CSV
    measuring_points: PathBuf,
    /// Transform and validate only; the target database is not contacted
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct LoadPhotosArgs {
    /// Photo index CSV
    index: PathBuf,
    /// Directory holding the photo files named in the index
    photo_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let _guard = match logging::init(cli.global.log_level, cli.global.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        started = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        account = %environment::current_account(),
        command = cli.command.name(),
        log_level = ?cli.global.log_level,
        feedback = cli.global.feedback,
        "hydromon {}",
        env!("CARGO_PKG_VERSION")
    );

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_environment_failure(&err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(ENVIRONMENT_FAILURE)
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.global.config.as_deref())?;

    match cli.command {
        Command::Migrate => handle_migrate(&cli.global, &config).await,
        Command::LoadData(args) => handle_load_data(&cli.global, &config, args).await,
        Command::LoadPhotos(args) => handle_load_photos(&cli.global, &config, args).await,
    }
}

fn database_url(global: &GlobalArgs) -> Result<String, EnvironmentError> {
    global
        .server
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok())
        .or_else(|| env::var("HYDROMON_DATABASE_URL").ok())
        .ok_or(EnvironmentError::MissingDatabaseUrl)
}

/// Credentials and connectivity failures, plus a store that stopped
/// accepting transactions mid-run.
fn is_environment_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EnvironmentError>().is_some()
        || matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Begin { .. } | LoadError::Rollback { .. })
        )
}

async fn handle_migrate(global: &GlobalArgs, config: &HydroConfig) -> Result<()> {
    environment::check_credentials(&config.credentials.expected_accounts)?;
    let url = database_url(global)?;
    let pool = db::connect(&url, &config.database)
        .await
        .map_err(|err| EnvironmentError::Unreachable {
            message: format!("{err:#}"),
        })?;

    db::run_migrations(&pool).await?;
    info!("Schema migrations are up to date");
    Ok(())
}

async fn handle_load_data(
    global: &GlobalArgs,
    config: &HydroConfig,
    args: LoadDataArgs,
) -> Result<()> {
    let sources = LoadSources {
        stations: StationsFeed.read_path(&args.stations)?,
        monitoring: MonitoringFeed
            .read_cache(&args.monitoring)
            .context("failed to read the monitoring sheet")?,
        measuring_points: MeasuringPointFeed
            .read_index(&args.measuring_points)
            .context("failed to read the measuring points")?,
    };
    info!(
        stations = sources.stations.len(),
        monitored_stations = sources.monitoring.station_count(),
        "Source feeds read"
    );

    let options = LoadOptions {
        feedback: global.feedback,
        dry_run: args.dry_run,
        rules: config.transform.clone(),
    };

    let report = if args.dry_run {
        info!("Dry run: the target database will not be contacted");
        load_data(&MemoryStore::new(), &sources, &options).await?
    } else {
        environment::check_credentials(&config.credentials.expected_accounts)?;
        let store = environment::connect_target(&database_url(global)?, &config.database).await?;
        load_data(&store, &sources, &options).await?
    };

    println!("{}\n\n{}", report.input, report.output);
    Ok(())
}

async fn handle_load_photos(
    global: &GlobalArgs,
    config: &HydroConfig,
    args: LoadPhotosArgs,
) -> Result<()> {
    let index = PhotoIndexFeed.read_path(&args.index)?;
    if !args.photo_dir.is_dir() {
        anyhow::bail!("photo directory {} does not exist", args.photo_dir.display());
    }

    environment::check_credentials(&config.credentials.expected_accounts)?;
    let store = environment::connect_target(&database_url(global)?, &config.database).await?;

    let options = PhotoOptions {
        feedback: global.feedback,
        tags: config.photos.clone(),
    };
    let report = load_photos(&store, &index, &args.photo_dir, &options).await?;

    println!("{}\n\n{}", report.input, report.output);
    if !report.unindexed_files.is_empty() {
        println!(
            "{} file(s) in {} are not in the photo index",
            report.unindexed_files.len(),
            args.photo_dir.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "hydromon",
            "load-data",
            "stations.csv",
            "monitoring.csv",
            "points.csv",
            "--dry-run",
            "--feedback",
            "25",
            "--log-level",
            "datadebug",
        ])
        .unwrap();

        assert_eq!(cli.global.feedback, 25);
        assert_eq!(cli.global.log_level, LogLevel::Datadebug);
        match cli.command {
            Command::LoadData(args) => {
                assert!(args.dry_run);
                assert_eq!(args.measuring_points, PathBuf::from("points.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn environment_failures_are_recognised_through_context() {
        let err = anyhow::Error::new(EnvironmentError::MissingDatabaseUrl).context("connecting");
        assert!(is_environment_failure(&err));

        let err = anyhow::anyhow!("photo directory missing");
        assert!(!is_environment_failure(&err));
    }
}

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const WORKSPACE_DEBUG: &str = "hydromon=debug,hydromon_core=debug,hydromon_parser=debug";

/// Operator-facing verbosity. `Data` adds entity dumps to `Debug`;
/// `Datadebug` adds the raw source records as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Data,
    Datadebug,
}

impl LogLevel {
    pub fn directives(&self) -> String {
        match self {
            LogLevel::Critical | LogLevel::Error => "error".to_string(),
            LogLevel::Warning => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => format!("info,{WORKSPACE_DEBUG},hydromon::data=info"),
            LogLevel::Data => format!("info,{WORKSPACE_DEBUG},hydromon::data=debug"),
            LogLevel::Datadebug => format!("info,{WORKSPACE_DEBUG},hydromon::data=trace"),
        }
    }
}

/// Installs the global subscriber: stdout always, plus the log file when
/// one is given. `RUST_LOG` overrides `level`. Keep the returned guard
/// alive until exit or buffered file output is lost.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).context("RUST_LOG is not a valid filter")?
        }
        _ => EnvFilter::new(level.directives()),
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_exclusive(path)?);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}

/// Creates `path` for writing; an existing file is never appended to.
pub fn open_exclusive(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create log file {} (it must not exist)", path.display()))
}

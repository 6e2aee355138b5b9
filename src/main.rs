use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tagsync::catalog::http::format_catalog_error;
use tagsync::config::{Config, RunClock};
use tagsync::discovery::{FileDiscovery, ResourceDiscovery, TaggingApiDiscovery};
use tagsync::sync;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Sync tagged AWS resources into LeanIX
#[derive(Parser, Debug)]
#[command(name = "tagsync", version, about, long_about = None)]
struct Args {
    /// Config file (JSON); defaults to the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// LeanIX workspace URL
    #[arg(long)]
    base_url: Option<String>,

    /// Application fact sheet to link components to
    #[arg(short, long)]
    application: Option<String>,

    /// Tag key to filter resources by
    #[arg(long)]
    tag_key: Option<String>,

    /// Tag value to filter resources by
    #[arg(long)]
    tag_value: Option<String>,

    /// Read resources from a JSON file instead of the AWS Tagging API
    #[arg(long)]
    resources_file: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Write logs to a file instead of stderr (default: user config dir)
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--log-level` when set.
fn setup_logging(
    level: LogLevel,
    log_file: Option<PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    let guard = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            builder
                .with_writer(non_blocking.with_max_level(tracing_level))
                .with_file(true)
                .with_line_number(true)
                .init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    };

    tracing::debug!("tagsync started with log level: {:?}", level);
    Ok(guard)
}

/// Log path used when `--log-file` is given without a value
fn default_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tagsync").join("tagsync.log");
    }
    PathBuf::from("tagsync.log")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .map(|path| path.unwrap_or_else(default_log_path));
    let _log_guard = setup_logging(args.log_level, log_file)?;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env();
    if let Some(base_url) = args.base_url {
        config.base_url = Some(base_url);
    }
    if let Some(application) = args.application {
        config.application_name = Some(application);
    }
    if let Some(tag_key) = args.tag_key {
        config.tag_key = tag_key;
    }
    if let Some(tag_value) = args.tag_value {
        config.tag_value = tag_value;
    }

    let settings = match config.validate() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::debug!("Settings: {:?}", settings);

    let discovery: Box<dyn ResourceDiscovery> = match args.resources_file {
        Some(path) => Box::new(FileDiscovery::new(path)),
        None => Box::new(TaggingApiDiscovery::new(settings.aws_region.clone())),
    };

    let clock = RunClock::now();
    let response = sync::handle(discovery.as_ref(), &settings, &clock).await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(message) = failure_hint(&response.body) {
            eprintln!("Error: {message}");
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Operator hint for a failed run, derived from the envelope's error text
fn failure_hint(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?.as_str()?;
    Some(format_catalog_error(&error))
}

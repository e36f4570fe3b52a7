use std::fs;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter, fmt, EnvFilter, Layer};

/// Target the access log middleware writes under.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// Log directory and how many daily files of each kind are kept.
pub struct LogConfig {
    pub log_dir: String,
    pub general_log_retention_days: usize,
    pub access_log_retention_days: usize,
    pub error_log_retention_days: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            general_log_retention_days: 10,
            access_log_retention_days: 10,
            error_log_retention_days: 30,
        }
    }
}

impl LogConfig {
    /// Defaults, with the directory taken from `LOG_DIR` when set.
    pub fn from_env() -> Self {
        Self::with_log_dir(std::env::var("LOG_DIR").ok())
    }

    fn with_log_dir(dir: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = dir.filter(|d| !d.trim().is_empty()) {
            config.log_dir = dir;
        }
        config
    }
}

/// `info-*.log`: application events below ERROR. Access lines have their own file.
fn goes_to_general(level: &Level, target: &str) -> bool {
    *level != Level::ERROR && *level <= Level::INFO && target != ACCESS_LOG_TARGET
}

/// `access-*.log`: every request line, whatever its level.
fn goes_to_access(target: &str) -> bool {
    target == ACCESS_LOG_TARGET
}

/// `error-*.log`: ERROR events, failed requests included.
fn goes_to_error(level: &Level) -> bool {
    *level == Level::ERROR
}

fn daily_writer(
    config: &LogConfig,
    prefix: &str,
    retention_days: usize,
    guards: &mut Vec<WorkerGuard>,
) -> Result<NonBlocking, Box<dyn std::error::Error>> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(retention_days)
        .build(&config.log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    Ok(writer)
}

/// Installs the global subscriber: daily `info`, `access` and `error` files
/// plus the console (filtered by `RUST_LOG`, default `info`).
///
/// The returned guards flush the non-blocking writers and must live as long
/// as the process logs.
pub fn init_logging(config: LogConfig) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
    fs::create_dir_all(&config.log_dir)?;

    let mut guards = Vec::new();
    let general_writer = daily_writer(
        &config,
        "info",
        config.general_log_retention_days,
        &mut guards,
    )?;
    let access_writer = daily_writer(
        &config,
        "access",
        config.access_log_retention_days,
        &mut guards,
    )?;
    let error_writer = daily_writer(&config, "error", config.error_log_retention_days, &mut guards)?;

    let (console_writer, console_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(console_guard);

    let general_layer = fmt::layer()
        .with_writer(general_writer)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| {
            goes_to_general(meta.level(), meta.target())
        }));

    // The line is already formatted; no level or target prefix
    let access_layer = fmt::layer()
        .with_writer(access_writer)
        .with_ansi(false)
        .with_level(false)
        .with_target(false)
        .without_time()
        .with_filter(filter::filter_fn(|meta| goes_to_access(meta.target())));

    let error_layer = fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| goes_to_error(meta.level())));

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(console_writer)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(general_layer)
        .with(access_layer)
        .with(error_layer)
        .with(console_layer)
        .try_init()?;

    Ok(guards)
}

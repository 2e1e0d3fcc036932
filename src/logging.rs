//! Tracing subscriber setup for the command line host

use std::ffi::OsStr;
use std::path::Path;

use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is not set
const DEFAULT_FILTER: &str = "plugin_update_provider=info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install a global subscriber writing to `log_path`.
///
/// The returned guard flushes buffered lines on drop and must be held for the
/// life of the process.
pub fn init(log_path: &Path, format: LogFormat) -> std::io::Result<WorkerGuard> {
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| OsStr::new("plugin-update-provider.log"));
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(filter)
            .with_ansi(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(non_blocking)
            .with_env_filter(filter)
            .init(),
    }

    Ok(guard)
}

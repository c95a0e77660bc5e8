use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

pub const LOG_FILE_PREFIX: &str = "product-api.log";

/// Console plus a daily rolling file under `log_dir`. Keep the returned guard
/// alive or buffered file output is lost on exit.
pub fn init(config: &AppConfig) -> Result<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(config)?);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_level()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

fn file_appender(config: &AppConfig) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&config.log_dir)
        .map_err(|e| {
            AppError::ConfigError(format!(
                "Cannot open log directory {}: {}",
                config.log_dir.display(),
                e
            ))
        })
}

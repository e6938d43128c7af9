use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::constants::file::LOG_FILE_NAME;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub log_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: Level::INFO,
            format: LogFormat::Compact,
            log_directory: None,
        }
    }
}

/// Install the global subscriber: screen output plus, when a directory is given, a
/// `test.log` file written off-thread.
///
/// Keep the returned guard alive for the run; dropping it flushes and closes the file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let screen_layer = match config.format {
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_span_events(FmtSpan::CLOSE).boxed(),
        LogFormat::Json => fmt::layer().json().with_span_events(FmtSpan::CLOSE).boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(screen_layer);

    match config.log_directory {
        Some(log_dir) => {
            std::fs::create_dir_all(&log_dir)?;
            let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            subscriber.with(file_layer).try_init()?;
            Ok(Some(guard))
        }
        None => {
            subscriber.try_init()?;
            Ok(None)
        }
    }
}

/// Screen-only logging for the CLI before an options file has been read.
pub fn init_simple_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .compact()
        .with_target(false)
        .try_init();
}

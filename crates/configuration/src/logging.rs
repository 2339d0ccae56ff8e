use crate::error::ConfigError;
use crate::settings::{LogLevel, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Third-party targets that are too chatty at debug level.
const QUIET_TARGETS: [(&str, &str); 3] = [("hyper_util", "warn"), ("reqwest", "info"), ("rustls", "warn")];

/// Builds the `EnvFilter` for a base level. `RUST_LOG` wins when it is set.
pub fn build_env_filter(level: LogLevel) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.as_directive().to_string()];
    for (target, lvl) in QUIET_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }
    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| ConfigError::LoggingError(format!("invalid filter '{}': {}", filter_str, e)))
}

/// Installs the global tracing subscriber.
///
/// Console output goes to stderr so it never interleaves with query results on
/// stdout. When `config.directory` is set, a daily rolling file is written as
/// well; the returned guard must be held until exit so buffered lines are
/// flushed.
pub fn init_tracing(
    config: &LoggingConfig,
    level_override: Option<LogLevel>,
) -> Result<Option<WorkerGuard>, ConfigError> {
    let level = level_override.unwrap_or(config.level);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(build_env_filter(level)?);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_target(true)
                .with_filter(build_env_filter(level)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}

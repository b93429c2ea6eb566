//! Logging setup for DoseWatch.
//!
//! Every binary calls [`init_from_config`] (or [`init`] in tools and tests) once
//! at startup. Events go to stdout and, depending on [`LoggingConfig`], to a
//! daily rolling file and to journald.

use dosewatch_config::LoggingConfig;
use std::str::FromStr;
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "dosewatch.log";

/// Keeps the background file writer alive. Drop it only at shutdown.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize stdout logging at INFO.
///
/// ```
/// use dosewatch_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG); // no-op, already initialized
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize stdout logging at the given level.
pub fn init_with_level(level: Level) {
    let config = LoggingConfig {
        level: level.to_string(),
        ..LoggingConfig::default()
    };
    // No file sink, so there is no guard to keep.
    let _ = init_from_config(&config);
}

/// Initialize logging from configuration.
///
/// `RUST_LOG` is honoured; `level` is added as a `dosewatch=<level>` directive.
/// Calling this twice is harmless: the second subscriber is discarded.
pub fn init_from_config(config: &LoggingConfig) -> LoggingGuard {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = Directive::from_str(&format!("dosewatch={}", level)) {
        filter = filter.add_directive(directive);
    }

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let mut journald_warning = None;
    #[cfg(target_os = "linux")]
    let journald_layer = if config.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                journald_warning = Some(format!("journald unavailable: {}", e));
                None
            }
        }
    } else {
        None
    };
    #[cfg(not(target_os = "linux"))]
    let journald_layer: Option<tracing_subscriber::layer::Identity> = {
        if config.journald {
            journald_warning = Some("journald is only supported on Linux".to_string());
        }
        None
    };

    let result = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(journald_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
        if let Some(directory) = &config.directory {
            info!("Writing daily log files to {}", directory);
        }
        if let Some(warning) = journald_warning {
            warn!("{}", warning);
        }
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Logs the outcome of `result` and hands it back unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}

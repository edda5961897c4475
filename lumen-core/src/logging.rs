//! Logging setup for the Lumen shell.
//!
//! Built on the `tracing` ecosystem: a console layer is always installed and
//! an optional file layer (plain text or JSON) is added when the
//! configuration names a log file.

use crate::config::LoggingConfig;
use crate::error::{CoreError, LoggingError};
use crate::utils::fs::ensure_dir_exists;

use std::io::IsTerminal;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Initialize a minimal logger writing to stderr.
///
/// Intended for tests and for early startup before the configuration has
/// been loaded. Honors `RUST_LOG`, defaulting to `info`. If a global
/// subscriber is already installed the call is a no-op.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

fn file_layer(
    log_path: &Path,
    format: &str,
) -> Result<Box<dyn Layer<Registry> + Send + Sync + 'static>, CoreError> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }

    let appender = tracing_appender::rolling::daily(
        log_path.parent().unwrap_or_else(|| Path::new(".")),
        log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("lumen.log")),
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // The guard flushes buffered records on drop; it must live as long as
    // the process does.
    Box::leak(Box::new(guard));

    let layer: Box<dyn Layer<Registry> + Send + Sync + 'static> =
        if format.eq_ignore_ascii_case("json") {
            Box::new(fmt::layer().json().with_writer(writer).with_ansi(false))
        } else {
            Box::new(fmt::layer().with_writer(writer).with_ansi(false))
        };
    Ok(layer)
}

/// Install the global logging subscriber described by `config`.
///
/// Returns an error if the configured level does not parse or if the global
/// subscriber was already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::Initialization(format!("bad log level filter: {e}")))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>> = Vec::new();
    layers.push(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .boxed(),
    );
    if let Some(path) = &config.file_path {
        layers.push(file_layer(path, &config.format)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::Initialization(e.to_string()))?;

    tracing::debug!(level = %config.level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_logging_is_idempotent() {
        init_minimal_logging();
        init_minimal_logging();
    }

    #[test]
    fn bad_level_is_rejected() {
        let config = LoggingConfig {
            level: "[[[not-a-filter".into(),
            file_path: None,
            format: "text".into(),
        };
        assert!(init_logging(&config).is_err());
    }
}

//! Error handling for the Lumen core layer.
//!
//! Error enums are defined with `thiserror` and kept per concern: one for
//! configuration, one for logging, and an umbrella [`CoreError`] used where
//! a caller does not care which subsystem failed.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error type for the core layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The logging system could not be initialized.
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    /// A generic error with a custom message.
    #[error("{0}")]
    Generic(String),

    /// An error wrapped with additional context.
    #[error("{context}: {source}")]
    WithContext {
        /// Description of what was being attempted.
        context: String,
        /// The underlying error.
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Create a generic error from any message.
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        CoreError::Generic(msg.into())
    }

    /// Wrap this error with context describing the failed operation.
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        CoreError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path of the offending file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file contains invalid TOML.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value failed validation.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending configuration key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The platform configuration directory could not be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,
}

/// Errors produced while setting up the logging system.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The global subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Initialization(String),

    /// An I/O error occurred while preparing log output.
    #[error("logging I/O error: {0}")]
    Io(#[from] io::Error),
}

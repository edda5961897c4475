//! Loading and validating the core configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs::ensure_dir_exists;
use crate::utils::paths::{app_config_dir, app_state_dir};

const CONFIG_FILE: &str = "config.toml";

const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: &[&str] = &["text", "json"];

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `config.toml` from the application configuration directory.
    ///
    /// A missing file yields the default configuration; read, parse and
    /// validation failures are errors.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let path = app_config_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<CoreConfig, CoreError> {
        let mut config = match fs::read_to_string(path) {
            Ok(text) => toml::from_str::<CoreConfig>(&text).map_err(ConfigError::Parse)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                CoreConfig::default()
            }
            Err(e) => {
                return Err(ConfigError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
                .into())
            }
        };
        Self::validate(&mut config)?;
        Ok(config)
    }

    fn validate(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level = config.logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".into(),
                message: format!("'{}' is not a log level", config.logging.level),
            }
            .into());
        }
        config.logging.level = level;

        let format = config.logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".into(),
                message: format!("'{}' is not a log format", config.logging.format),
            }
            .into());
        }
        config.logging.format = format;

        // A relative log file lands in the state directory.
        if let Some(file) = &config.logging.file_path {
            if file.is_relative() {
                let state = app_state_dir()?;
                ensure_dir_exists(&state)?;
                config.logging.file_path = Some(state.join(file));
            }
        }
        Ok(())
    }
}

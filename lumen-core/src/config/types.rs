//! Configuration data structures.

use super::defaults;
use serde::Deserialize;
use std::path::PathBuf;

/// Settings for the logging subsystem.
///
/// ```
/// use lumen_core::config::LoggingConfig;
///
/// let config: LoggingConfig = toml::from_str(
///     r#"
///     level = "debug"
///     format = "json"
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.level, "debug");
/// assert_eq!(config.file_path, None);
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level to record: "trace", "debug", "info", "warn" or "error".
    #[serde(default = "defaults::log_level")]
    pub level: String,
    /// Optional log file. Relative paths resolve against the state directory.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// File log format, "text" or "json".
    #[serde(default = "defaults::log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file_path: None,
            format: defaults::log_format(),
        }
    }
}

/// Root configuration for the core layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Logging subsystem settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_when_fields_missing() {
        let config: CoreConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.logging.file_path, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<CoreConfig, _> = toml::from_str("[surprise]\nvalue = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: CoreConfig = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "text");
    }
}

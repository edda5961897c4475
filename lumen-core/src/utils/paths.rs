//! Application directory resolution.

use directories_next::ProjectDirs;
use std::path::PathBuf;

use crate::error::ConfigError;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "lumen-shell";
const APPLICATION: &str = "lumen";

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or(ConfigError::NoConfigDir)
}

/// Directory holding `config.toml` and `transitions.toml`.
pub fn app_config_dir() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

/// Directory for mutable state such as log files and the first-start stamp.
pub fn app_state_dir() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.data_local_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        let dir = app_config_dir().unwrap();
        assert!(dir.to_string_lossy().to_lowercase().contains("lumen"));
    }
}

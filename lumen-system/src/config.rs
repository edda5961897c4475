//! Transition configuration.
//!
//! A `(section, key)` store deserialized from `transitions.toml`. The render
//! manager reads it on every blur retarget, so edits picked up by a reload
//! take effect on the next transition without restarting the shell. Every
//! key has a compiled-in default; a missing file yields the defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use lumen_core::utils::paths::app_config_dir;
use serde::Deserialize;

use crate::error::SystemError;

const TRANSITIONS_FILE: &str = "transitions.toml";

/// Blur, dim and zoom parameters for the home layer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HomeSection {
    pub saturation: f32,
    pub brightness: f32,
    pub radius: f32,
    /// Radius used when the transition also zooms, which hides artifacts of
    /// a stronger blur.
    pub radius_more: f32,
    pub zoom: f32,
    pub zoom_applets: f32,
}

impl Default for HomeSection {
    fn default() -> Self {
        Self {
            saturation: 0.8,
            brightness: 0.5,
            radius: 8.0,
            radius_more: 12.0,
            zoom: 0.95,
            zoom_applets: 1.0,
        }
    }
}

/// Zoom parameters for the task navigator layer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TaskNavSection {
    pub zoom: f32,
    pub zoom_for_home: f32,
}

impl Default for TaskNavSection {
    fn default() -> Self {
        Self {
            zoom: 0.9,
            zoom_for_home: 1.0,
        }
    }
}

/// Timing of the blur transition timeline.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BlurSection {
    /// Timeline duration in milliseconds.
    pub duration: u32,
}

impl Default for BlurSection {
    fn default() -> Self {
        Self { duration: 250 }
    }
}

/// Launcher glow timings; `duration_out` also paces the loading-image fade.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherGlowSection {
    pub duration_in: u32,
    pub duration_out: u32,
    pub brightness: f32,
    pub radius: f32,
}

impl Default for LauncherGlowSection {
    fn default() -> Self {
        Self {
            duration_in: 200,
            duration_out: 150,
            brightness: 1.2,
            radius: 4.0,
        }
    }
}

/// The full transitions store.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub home: HomeSection,
    pub task_nav: TaskNavSection,
    pub blur: BlurSection,
    pub launcher_glow: LauncherGlowSection,
}

impl TransitionConfig {
    /// Load `transitions.toml` from the application configuration directory.
    pub fn load() -> Result<Self, SystemError> {
        let path = app_config_dir()
            .map_err(lumen_core::error::CoreError::from)?
            .join(TRANSITIONS_FILE);
        Self::load_from(&path)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SystemError> {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .map_err(|e| SystemError::TransitionConfig(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no transitions file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(SystemError::TransitionConfig(format!(
                "{}: {e}",
                path.display()
            ))),
        }
    }
}

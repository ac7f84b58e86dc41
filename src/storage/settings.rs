//! User settings
//!
//! Per-user settings are stored in `~/.config/kiln/config.toml` (or the
//! platform equivalent), overridable with the `KILN_SETTINGS` environment
//! variable. A missing file means defaults.
//!
//! ```toml
//! deploy_path = "/home/me/widgets"
//! jsdoc_command = "npx jsdoc"
//! plugin_dirs = ["/opt/kiln/plugins"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative settings file
pub const SETTINGS_ENV: &str = "KILN_SETTINGS";

/// User-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory deployed projects are copied into
    pub deploy_path: Option<PathBuf>,

    /// Command used to generate documentation, split on whitespace
    pub jsdoc_command: String,

    /// Extra directories searched for plugins
    pub plugin_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deploy_path: None,
            jsdoc_command: "jsdoc".to_string(),
            plugin_dirs: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `KILN_SETTINGS` or the user config directory
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from a specific file, defaulting when it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Returns the settings file location
    pub fn settings_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Returns the deploy root: the configured path, else the user data directory
    pub fn deploy_root(&self) -> Option<PathBuf> {
        self.deploy_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("deploy")))
    }

    /// Returns the documentation command as program and arguments
    pub fn jsdoc_argv(&self) -> Vec<String> {
        self.jsdoc_command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "kiln", "kiln")
    }
}

//! # Storage Layer
//!
//! Everything kiln reads from or writes to disk outside of stage logic.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Project config | JSON with whole-line `//` comments | `project.cfg` |
//! | User settings | TOML | `~/.config/kiln/config.toml` or `$KILN_SETTINGS` |
//! | Build output | Files | `build/<name>/` |
//! | Test output | Files | `build/<name>_test/` or `build/<name>_<test>/` |
//! | Documentation | Files | `build/<name>_doc/` |
//! | Archive | Zip | `build/<name>-<version>.zip` |
//!
//! ## Key Types
//!
//! - [`ConfigStore`] - Loads and validates `project.cfg`
//! - [`ProjectConfig`] - The validated configuration every stage reads
//! - [`Project`] - Scaffolding, cleaning and project locations
//! - [`Settings`] - Per-user settings

mod config;
pub mod files;
mod project;
mod settings;

pub use config::{
    strip_comments, ConfigDocument, ConfigError, ConfigStore, ProjectConfig, CONFIG_FILE,
    DEFAULT_JS_NAME, DEFAULT_TYPE,
};
pub use files::FsError;
pub use project::{Project, ProjectError};
pub use settings::{Settings, SETTINGS_ENV};

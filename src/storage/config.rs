//! Project configuration
//!
//! Configuration is stored in `project.cfg` at the project root: a JSON
//! object in which whole-line `//` comments are allowed.
//!
//! ```text
//! // shown in the dashboard
//! {
//!     "name": "weather",
//!     "version": "1.2.0",
//!     // "type": "widget",
//!     "minify_js": true
//! }
//! ```
//!
//! Optional keys fall back to their defaults when absent, of the wrong type
//! or empty; each key is coerced on its own.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{PipelinePlan, Stage};

/// File name of the project configuration
pub const CONFIG_FILE: &str = "project.cfg";

/// Default for `type`
pub const DEFAULT_TYPE: &str = "default";

/// Default for `js_name`
pub const DEFAULT_JS_NAME: &str = "application";

static COMMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//.*").expect("valid comment pattern"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find a config file at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The config file could not be parsed: {0}")]
    Parse(String),

    #[error("The config file has no '{0}' key")]
    MissingField(&'static str),

    #[error("Invalid '{field}' in config file: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) | ConfigError::Unreadable { .. } => "ConfigNotFound",
            ConfigError::Parse(_) => "ConfigParseError",
            ConfigError::MissingField(_) => "ConfigMissingField",
            ConfigError::InvalidField { .. } => "ConfigInvalidField",
        }
    }
}

/// Validated project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    /// Project working directory
    pub root: PathBuf,

    pub name: String,
    pub version: String,

    /// Project type, selects the plugin
    #[serde(rename = "type")]
    pub project_type: String,

    pub minify_js: bool,
    pub minify_css: bool,

    /// File stem of the built JavaScript bundle
    pub js_name: String,

    /// `<root>/build/<name>`
    pub build_path: PathBuf,

    /// Test output directory, only when a test stage is planned
    pub test_path: Option<PathBuf>,

    /// Selected sub-test, `None` for the whole suite
    pub test_name: Option<String>,

    /// A build produces output during this invocation
    pub should_build: bool,
}

impl ProjectConfig {
    /// Returns the directory holding all build outputs
    pub fn output_root(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Returns the documentation output directory
    pub fn doc_path(&self) -> PathBuf {
        self.output_root().join(format!("{}_doc", self.name))
    }

    /// Returns the path of the project archive
    pub fn archive_path(&self) -> PathBuf {
        self.output_root()
            .join(format!("{}-{}.zip", self.name, self.version))
    }
}

/// Fields read from the config document, before derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub name: String,
    pub version: String,
    pub project_type: String,
    pub minify_js: bool,
    pub minify_css: bool,
    pub js_name: String,
}

impl ConfigDocument {
    /// Parses and validates config text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let stripped = strip_comments(text);
        let value: Value =
            serde_json::from_str(&stripped).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let Value::Object(map) = value else {
            return Err(ConfigError::Parse("expected a JSON object".to_string()));
        };

        Self::from_map(&map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        let name = match map.get("name") {
            None => return Err(ConfigError::MissingField("name")),
            Some(Value::String(s)) if s.is_empty() => {
                return Err(ConfigError::InvalidField {
                    field: "name",
                    reason: "must be at least one character long".to_string(),
                })
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: "name",
                    reason: "must be a string".to_string(),
                })
            }
        };

        let version = match map.get("version") {
            None => return Err(ConfigError::MissingField("version")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: "version",
                    reason: "must be a string".to_string(),
                })
            }
        };

        Ok(Self {
            name,
            version,
            project_type: string_or(map, "type", DEFAULT_TYPE),
            minify_js: bool_or_false(map, "minify_js"),
            minify_css: bool_or_false(map, "minify_css"),
            js_name: string_or(map, "js_name", DEFAULT_JS_NAME),
        })
    }

    /// Derives the full configuration for a planned pipeline
    pub fn resolve(self, root: &Path, plan: &PipelinePlan) -> ProjectConfig {
        let output_root = root.join("build");
        let build_path = output_root.join(&self.name);

        let (test_path, test_name) = if plan.requests(Stage::Test) {
            let dir = match &plan.test_name {
                Some(test) => format!("{}_{}", self.name, test),
                None => format!("{}_test", self.name),
            };
            (Some(output_root.join(dir)), plan.test_name.clone())
        } else {
            (None, None)
        };

        ProjectConfig {
            root: root.to_path_buf(),
            name: self.name,
            version: self.version,
            project_type: self.project_type,
            minify_js: self.minify_js,
            minify_css: self.minify_css,
            js_name: self.js_name,
            build_path,
            test_path,
            test_name,
            should_build: plan.builds(),
        }
    }
}

/// Removes every line that is entirely a `//` comment
pub fn strip_comments(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !COMMENT_LINE.is_match(line))
        .collect()
}

fn string_or(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

fn bool_or_false(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Reads `project.cfg` from a project root
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Creates the store for a project
    pub fn for_project(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the path to the config file
    pub fn path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Reads and validates the config document
    pub fn read(&self) -> Result<ConfigDocument, ConfigError> {
        let path = self.path();
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.clone()),
            _ => ConfigError::Unreadable {
                path: path.clone(),
                source,
            },
        })?;

        ConfigDocument::parse(&text)
    }

    /// Loads the configuration for a planned pipeline
    pub fn load(&self, plan: &PipelinePlan) -> Result<ProjectConfig, ConfigError> {
        Ok(self.read()?.resolve(&self.root, plan))
    }
}

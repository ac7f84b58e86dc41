//! Plugin capability interface
//!
//! A plugin receives the validated configuration once, then may react after
//! each pipeline stage. Hooks are declared up front with
//! [`ProjectPlugin::supports`]; an unsupported hook is never called.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Stage;
use crate::storage::ProjectConfig;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("No plugin found for project type '{0}' (looked for a built-in plugin and a 'kiln-{0}' executable)")]
    NotFound(String),

    #[error("Plugin '{plugin}' failed during {operation}: {message}")]
    Failed {
        plugin: String,
        operation: String,
        message: String,
    },
}

impl PluginError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            PluginError::NotFound(_) => "PluginNotFound",
            PluginError::Failed { .. } => "PluginFailed",
        }
    }

    pub fn failed(
        plugin: impl Into<String>,
        operation: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        PluginError::Failed {
            plugin: plugin.into(),
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

/// Post-stage hooks a plugin may implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    AfterBuild,
    AfterDocument,
    AfterTest,
    AfterDeploy,
    AfterArchive,
}

impl Hook {
    pub const ALL: [Hook; 5] = [
        Hook::AfterBuild,
        Hook::AfterDocument,
        Hook::AfterTest,
        Hook::AfterDeploy,
        Hook::AfterArchive,
    ];

    /// Returns the hook fired after a stage, if any
    pub fn after(stage: Stage) -> Option<Hook> {
        match stage {
            Stage::Build => Some(Hook::AfterBuild),
            Stage::Document => Some(Hook::AfterDocument),
            Stage::Test => Some(Hook::AfterTest),
            Stage::Deploy => Some(Hook::AfterDeploy),
            Stage::Archive => Some(Hook::AfterArchive),
            Stage::Clean | Stage::Scaffold => None,
        }
    }

    /// Returns the operation name used in the plugin protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::AfterBuild => "after_build",
            Hook::AfterDocument => "after_document",
            Hook::AfterTest => "after_test",
            Hook::AfterDeploy => "after_deploy",
            Hook::AfterArchive => "after_archive",
        }
    }

    /// Parses a protocol operation name
    pub fn from_operation(operation: &str) -> Option<Hook> {
        Self::ALL.into_iter().find(|hook| hook.as_str() == operation)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-project-type extension
pub trait ProjectPlugin {
    /// Returns the plugin name
    fn name(&self) -> &str;

    /// Receives the validated configuration before any stage runs
    fn pass_config(&mut self, config: &ProjectConfig) -> Result<(), PluginError>;

    /// Returns true if the plugin implements the hook
    fn supports(&self, hook: Hook) -> bool;

    /// Runs a supported hook
    fn run_hook(&mut self, hook: Hook) -> Result<(), PluginError>;
}

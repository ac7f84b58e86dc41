//! Executable plugins speaking the JSON protocol
//!
//! Every request carries the configuration received through `pass_config`,
//! so a plugin process can stay stateless between hooks.

use std::path::{Path, PathBuf};

use super::hooks::{Hook, PluginError, ProjectPlugin};
use super::loader::{execute_at, PluginLoader, PLUGIN_PREFIX};
use super::protocol::{PluginManifest, PluginRequest};
use crate::storage::ProjectConfig;

const PASS_CONFIG: &str = "pass_config";

/// A `kiln-<type>` executable found by the loader
#[derive(Debug)]
pub struct ExternalPlugin {
    name: String,
    path: PathBuf,
    manifest: PluginManifest,
    config: serde_json::Value,
}

impl ExternalPlugin {
    /// Creates a plugin from an executable path and its manifest
    pub fn new(path: impl Into<PathBuf>, manifest: PluginManifest) -> Self {
        Self {
            name: manifest.name.clone(),
            path: path.into(),
            manifest,
            config: serde_json::Value::Null,
        }
    }

    /// Finds the executable for a project type and reads its manifest
    pub fn discover(
        loader: &mut PluginLoader,
        project_type: &str,
    ) -> Result<Option<Self>, PluginError> {
        let name = format!("{}{}", PLUGIN_PREFIX, project_type);
        let Some(path) = loader.get(&name).map(|info| info.path.clone()) else {
            return Ok(None);
        };

        let manifest = loader
            .get_manifest(&name)
            .map_err(|e| PluginError::failed(&name, "manifest", format!("{:#}", e)))?
            .ok_or_else(|| PluginError::NotFound(project_type.to_string()))?;

        Ok(Some(Self::new(path, manifest)))
    }

    /// Returns the executable path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the manifest the plugin declared
    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn send(&self, operation: &str) -> Result<(), PluginError> {
        let request = PluginRequest::new(
            operation,
            serde_json::json!({ "config": self.config.clone() }),
        );

        let response = execute_at(&self.path, &request)
            .map_err(|e| PluginError::failed(&self.name, operation, format!("{:#}", e)))?;

        if response.success {
            Ok(())
        } else {
            Err(PluginError::failed(
                &self.name,
                operation,
                response
                    .error
                    .unwrap_or_else(|| "plugin reported failure".to_string()),
            ))
        }
    }
}

impl ProjectPlugin for ExternalPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn pass_config(&mut self, config: &ProjectConfig) -> Result<(), PluginError> {
        self.config = serde_json::to_value(config)
            .map_err(|e| PluginError::failed(&self.name, PASS_CONFIG, e))?;

        if self.manifest.supports(PASS_CONFIG) {
            self.send(PASS_CONFIG)?;
        }
        Ok(())
    }

    fn supports(&self, hook: Hook) -> bool {
        self.manifest.supports(hook.as_str())
    }

    fn run_hook(&mut self, hook: Hook) -> Result<(), PluginError> {
        self.send(hook.as_str())
    }
}

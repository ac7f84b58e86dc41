//! Project type to plugin resolution

use std::collections::BTreeMap;

use super::external::ExternalPlugin;
use super::hooks::{PluginError, ProjectPlugin};
use super::loader::PluginLoader;
use crate::storage::DEFAULT_TYPE;

/// Builds a fresh built-in plugin instance
pub type PluginFactory = fn() -> Box<dyn ProjectPlugin>;

/// Maps project types to plugins
///
/// Built-in factories win; otherwise the loader is asked for a `kiln-<type>`
/// executable, scanning its directories on first use. The default type never
/// has a plugin.
pub struct PluginRegistry {
    builtins: BTreeMap<String, PluginFactory>,
    loader: PluginLoader,
    discovered: bool,
}

impl PluginRegistry {
    /// Creates a registry over discovered executables
    pub fn new(loader: PluginLoader) -> Self {
        Self {
            builtins: BTreeMap::new(),
            loader,
            discovered: false,
        }
    }

    /// Registers a built-in plugin for a project type
    pub fn register(&mut self, project_type: impl Into<String>, factory: PluginFactory) {
        self.builtins.insert(project_type.into(), factory);
    }

    /// Lists the types with built-in plugins
    pub fn builtin_types(&self) -> impl Iterator<Item = &str> {
        self.builtins.keys().map(String::as_str)
    }

    /// Returns the plugin for a project type, `None` for the default type
    pub fn resolve(
        &mut self,
        project_type: &str,
    ) -> Result<Option<Box<dyn ProjectPlugin>>, PluginError> {
        if project_type == DEFAULT_TYPE {
            return Ok(None);
        }

        if let Some(factory) = self.builtins.get(project_type) {
            return Ok(Some(factory()));
        }

        if !self.discovered {
            self.loader
                .discover()
                .map_err(|e| PluginError::failed(project_type, "discover", format!("{:#}", e)))?;
            self.discovered = true;
        }

        match ExternalPlugin::discover(&mut self.loader, project_type)? {
            Some(plugin) => Ok(Some(Box::new(plugin))),
            None => Err(PluginError::NotFound(project_type.to_string())),
        }
    }
}

//! Plugin discovery and execution
//!
//! Plugins are executables named `kiln-<type>`, discovered from:
//! 1. PATH
//! 2. Added plugin directories (project `.kiln/plugins/`, user settings)
//!
//! Later directories never override a plugin found earlier.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::protocol::{PluginManifest, PluginRequest, PluginResponse};

/// Executable name prefix for plugins
pub const PLUGIN_PREFIX: &str = "kiln-";

/// Information about a discovered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,

    /// Path to the plugin executable
    pub path: PathBuf,

    /// Plugin manifest (loaded on demand)
    pub manifest: Option<PluginManifest>,
}

/// Plugin loader and executor
pub struct PluginLoader {
    /// Discovered plugins
    plugins: BTreeMap<String, PluginInfo>,

    /// Additional plugin directories
    plugin_dirs: Vec<PathBuf>,

    /// Whether PATH is searched
    search_path: bool,
}

impl PluginLoader {
    /// Creates a new plugin loader
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
            plugin_dirs: Vec::new(),
            search_path: true,
        }
    }

    /// Creates a loader that only searches added directories
    pub fn without_path() -> Self {
        Self {
            search_path: false,
            ..Self::new()
        }
    }

    /// Adds a plugin directory to search
    pub fn add_plugin_dir(&mut self, dir: impl Into<PathBuf>) {
        self.plugin_dirs.push(dir.into());
    }

    /// Discovers all available plugins
    pub fn discover(&mut self) -> Result<()> {
        self.plugins.clear();

        if self.search_path {
            if let Ok(path_var) = std::env::var("PATH") {
                for dir in std::env::split_paths(&path_var) {
                    self.scan_directory(&dir)?;
                }
            }
        }

        for dir in &self.plugin_dirs.clone() {
            self.scan_directory(dir)?;
        }

        Ok(())
    }

    /// Scans a directory for plugins
    fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return Ok(()),
        };

        for entry in entries.flatten() {
            let path = entry.path();

            let Some(name) = path.file_stem().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };

            if name.starts_with(PLUGIN_PREFIX) && Self::is_executable(&path) {
                self.plugins
                    .entry(name.clone())
                    .or_insert_with(|| PluginInfo {
                        name,
                        path,
                        manifest: None,
                    });
            }
        }

        Ok(())
    }

    /// Checks if a file is executable
    fn is_executable(path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = path.metadata() {
                return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
            }
        }

        #[cfg(windows)]
        {
            if let Some(ext) = path.extension() {
                return ext == "exe" || ext == "bat" || ext == "cmd";
            }
        }

        false
    }

    /// Lists all discovered plugins in name order
    pub fn list(&self) -> Vec<&PluginInfo> {
        self.plugins.values().collect()
    }

    /// Gets a plugin by name
    pub fn get(&self, name: &str) -> Option<&PluginInfo> {
        self.plugins.get(name)
    }

    /// Gets the manifest for a plugin (loads if needed)
    pub fn get_manifest(&mut self, name: &str) -> Result<Option<PluginManifest>> {
        if let Some(info) = self.plugins.get_mut(name) {
            if info.manifest.is_none() {
                info.manifest = Some(Self::load_manifest(&info.path)?);
            }
            Ok(info.manifest.clone())
        } else {
            Ok(None)
        }
    }

    /// Loads the manifest from a plugin
    fn load_manifest(path: &Path) -> Result<PluginManifest> {
        let output = Command::new(path)
            .arg("--manifest")
            .output()
            .with_context(|| format!("Failed to execute plugin: {}", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Plugin returned error: {}", stderr.trim());
        }

        serde_json::from_slice(&output.stdout).context("Failed to parse plugin manifest")
    }

    /// Executes a plugin request
    pub fn execute(&self, name: &str, request: &PluginRequest) -> Result<PluginResponse> {
        let info = self
            .plugins
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Plugin not found: {}", name))?;

        execute_at(&info.path, request)
    }

    /// Tests plugin connectivity
    pub fn test(&self, name: &str) -> Result<bool> {
        let request = PluginRequest::new("test", serde_json::json!({}));
        let response = self.execute(name, &request)?;
        Ok(response.success)
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends one request to the plugin executable and reads its response line
pub fn execute_at(path: &Path, request: &PluginRequest) -> Result<PluginResponse> {
    let mut child = Command::new(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to spawn plugin: {}", path.display()))?;

    {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to open plugin stdin"))?;
        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;
        writeln!(stdin, "{}", request_json).context("Failed to write to plugin")?;
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to open plugin stdout"))?;
    let reader = BufReader::new(stdout);

    let response_line = reader
        .lines()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No response from plugin"))?
        .context("Failed to read plugin response")?;

    let response: PluginResponse =
        serde_json::from_str(&response_line).context("Failed to parse plugin response")?;

    let status = child.wait().context("Failed to wait for plugin")?;
    if !status.success() {
        anyhow::bail!("Plugin failed with {}", status);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_loader_is_empty() {
        let loader = PluginLoader::new();
        assert!(loader.list().is_empty());
    }

    #[test]
    fn add_plugin_dir() {
        let mut loader = PluginLoader::new();
        loader.add_plugin_dir("/some/path");

        assert_eq!(loader.plugin_dirs.len(), 1);
    }

    #[test]
    fn discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        let mut loader = PluginLoader::without_path();
        loader.add_plugin_dir(dir.path());
        loader.discover().unwrap();

        assert!(loader.list().is_empty());
    }

    #[test]
    fn get_nonexistent_plugin() {
        let loader = PluginLoader::new();
        assert!(loader.get("kiln-nonexistent").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn discover_only_prefixed_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        for (name, mode) in [("kiln-widget", 0o755), ("kiln-readonly", 0o644), ("other-tool", 0o755)] {
            let path = dir.path().join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }

        let mut loader = PluginLoader::without_path();
        loader.add_plugin_dir(dir.path());
        loader.discover().unwrap();

        let names: Vec<_> = loader.list().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["kiln-widget"]);
    }

    #[cfg(unix)]
    #[test]
    fn first_plugin_found_wins() {
        use std::os::unix::fs::PermissionsExt;

        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for dir in [&first, &second] {
            let path = dir.path().join("kiln-widget");
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let mut loader = PluginLoader::without_path();
        loader.add_plugin_dir(first.path());
        loader.add_plugin_dir(second.path());
        loader.discover().unwrap();

        assert_eq!(loader.list().len(), 1);
        assert_eq!(loader.get("kiln-widget").unwrap().path, first.path().join("kiln-widget"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_fails_even_after_a_success_response() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiln-widget");
        std::fs::write(&path, "#!/bin/sh\nread line\necho '{\"success\": true}'\nexit 4\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let request = PluginRequest::new("after_build", serde_json::json!({}));
        let err = execute_at(&path, &request).unwrap_err();

        assert!(err.to_string().contains("exit status"));
    }
}

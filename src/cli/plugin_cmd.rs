//! Plugin management commands

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::plugin::{PluginLoader, PLUGIN_PREFIX};
use crate::storage::{Project, Settings};

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List available plugins
    List,

    /// Test the plugin for a project type
    Test {
        /// Project type (or full plugin name)
        #[arg(value_name = "TYPE")]
        project_type: String,
    },
}

pub fn run(cmd: PluginCommands, cwd: &Path, output: &Output) -> Result<()> {
    let settings = Settings::load()?;
    let mut loader = loader_for(&Project::open(cwd), &settings);
    loader.discover()?;

    match cmd {
        PluginCommands::List => list_plugins(&loader, output),
        PluginCommands::Test { project_type } => test_plugin(&mut loader, output, &project_type),
    }
}

/// Returns a loader searching PATH, the project and the settings' directories
pub fn loader_for(project: &Project, settings: &Settings) -> PluginLoader {
    let mut loader = PluginLoader::new();
    loader.add_plugin_dir(project.plugins_dir());
    for dir in &settings.plugin_dirs {
        loader.add_plugin_dir(dir);
    }
    loader
}

fn list_plugins(loader: &PluginLoader, output: &Output) -> Result<()> {
    let plugins = loader.list();

    if output.is_json() {
        let items: Vec<_> = plugins
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "type": p.name.trim_start_matches(PLUGIN_PREFIX),
                    "path": p.path.display().to_string(),
                })
            })
            .collect();
        output.data(&items);
    } else if plugins.is_empty() {
        println!("No plugins found.");
        println!();
        println!("Plugins are discovered from:");
        println!("  - PATH (executables starting with '{}')", PLUGIN_PREFIX);
        println!("  - .kiln/plugins/ directory");
        println!("  - plugin_dirs in the settings file");
    } else {
        println!("Available plugins:");
        println!("{:<20} {:<30} PATH", "TYPE", "NAME");
        println!("{}", "-".repeat(80));
        for plugin in plugins {
            println!(
                "{:<20} {:<30} {}",
                plugin.name.trim_start_matches(PLUGIN_PREFIX),
                plugin.name,
                plugin.path.display()
            );
        }
    }

    Ok(())
}

fn test_plugin(loader: &mut PluginLoader, output: &Output, project_type: &str) -> Result<()> {
    let name = if project_type.starts_with(PLUGIN_PREFIX) {
        project_type.to_string()
    } else {
        format!("{}{}", PLUGIN_PREFIX, project_type)
    };

    if loader.get(&name).is_none() {
        anyhow::bail!("Plugin not found: {}", name);
    }

    let manifest = loader.get_manifest(&name)?;
    let test_result = loader.test(&name);

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": name,
            "manifest": manifest,
            "test_success": test_result.as_ref().ok().copied().unwrap_or(false),
            "test_error": test_result.as_ref().err().map(|e| format!("{:#}", e)),
        }));
    } else {
        if let Some(manifest) = manifest {
            println!("Plugin: {}", manifest.name);
            println!("Version: {}", manifest.version);
            println!("Description: {}", manifest.description);
            println!("Operations: {}", manifest.operations.join(", "));
            println!();
        }

        match test_result {
            Ok(true) => output.success(&format!("Plugin '{}' is working correctly", name)),
            Ok(false) => output.error(&format!("Plugin '{}' test returned false", name)),
            Err(e) => output.error(&format!("Plugin '{}' test failed: {:#}", name, e)),
        }
    }

    Ok(())
}

//! # Plugin System
//!
//! Per-project-type extensions that react to pipeline stages.
//!
//! ## Overview
//!
//! A project's `type` selects its plugin. The `default` type has none. Any
//! other type resolves to a built-in plugin registered in the
//! [`PluginRegistry`], or to an executable named `kiln-<type>` that speaks
//! JSON over stdin/stdout.
//!
//! ## Plugin Discovery
//!
//! Executables are discovered in three locations, earliest wins:
//! 1. `$PATH` - System-wide plugins
//! 2. `.kiln/plugins/` - Project-local plugins
//! 3. `plugin_dirs` from the user settings
//!
//! ## Protocol
//!
//! ```text
//! CLI                          Plugin Binary
//!  │                               │
//!  ├── Spawn: kiln-widget          │
//!  │                               │
//!  ├── Stdin: {"operation": "after_build", "params": {"config": {...}}}
//!  │                               │
//!  └── Stdout: {"success": true}
//! ```
//!
//! Every plugin must support `--manifest`. Its `operations` list is the set
//! of hooks the plugin implements; hooks it does not list are skipped.
//!
//! ## Key Types
//!
//! - [`ProjectPlugin`] - The capability interface the pipeline calls
//! - [`Hook`] - Post-stage hooks
//! - [`PluginRegistry`] - Resolves a project type to a plugin
//! - [`PluginLoader`] - Discovers and executes plugin binaries

mod external;
mod hooks;
mod loader;
mod protocol;
mod registry;

pub use external::ExternalPlugin;
pub use hooks::{Hook, PluginError, ProjectPlugin};
pub use loader::{PluginInfo, PluginLoader, PLUGIN_PREFIX};
pub use protocol::{PluginManifest, PluginRequest, PluginResponse};
pub use registry::{PluginFactory, PluginRegistry};

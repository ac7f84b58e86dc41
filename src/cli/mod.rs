//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `kiln new <NAME> <TYPE>` | Scaffold a project |
//! | `kiln clean` | Remove `build/` |
//! | `kiln --build --test --deploy ...` | Run pipeline stages |
//! | `kiln deps` | Show the require graph of an entry file |
//! | `kiln plugin list`, `kiln plugin test <TYPE>` | Inspect plugins |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! kiln --verbose --build
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.
//! Failures carry a kind name, see [`error_kind`].

mod app;
mod deps_cmd;
mod output;
mod plugin_cmd;

pub use app::{run, Cli, Commands, StageArgs};
pub use output::{Output, OutputFormat};

use crate::domain::{IncludeError, PlanError};
use crate::pipeline::{StageError, StageFailure};
use crate::plugin::PluginError;
use crate::storage::{ConfigError, FsError, ProjectError};

/// Returns the kind name of the first typed error in the chain
pub fn error_kind(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<StageFailure>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<StageError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<PlanError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<IncludeError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<FsError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<ProjectError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<PluginError>() {
            return e.kind();
        }
    }
    "Error"
}

//! kiln - A build orchestrator for front-end JavaScript/HTML/CSS projects
//!
//! kiln reads a project's `project.cfg`, plans the requested stages (build,
//! document, test, deploy, archive) and runs them in order. JavaScript files
//! are bundled by expanding `//= require <path>` directives, and a
//! per-project-type plugin can react after each stage.

pub mod domain;
pub mod storage;
pub mod pipeline;
pub mod stages;
pub mod plugin;
pub mod cli;

pub use domain::{InclusionResolver, PipelinePlan, Stage};
pub use pipeline::{RunReport, StageRunner};
pub use storage::{ConfigStore, ProjectConfig};

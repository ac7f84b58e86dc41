//! # Stage Collaborators
//!
//! The file-system side of each pipeline stage. Every stage borrows the
//! validated [`ProjectConfig`] and regenerates its output from scratch.
//!
//! | Stage | Type | Output |
//! |-------|------|--------|
//! | build | [`BuildStage`] | `build/<name>/` |
//! | test | [`TestStage`] | `build/<name>_test/` or `build/<name>_<test>/` |
//! | document | [`DocStage`] | `build/<name>_doc/` |
//! | deploy | [`DeployStage`] | `<deploy root>/<name>/` |
//! | archive | [`ArchiveStage`] | `build/<name>-<version>.zip` |

mod archive;
mod build;
mod deploy;
mod doc;
mod minify;
mod test_bundle;

use std::path::PathBuf;

pub use archive::ArchiveStage;
pub use build::BuildStage;
pub use deploy::DeployStage;
pub use doc::DocStage;
pub use test_bundle::TestStage;

use crate::pipeline::Collaborators;
use crate::storage::{ProjectConfig, Settings};

/// External inputs the stages need beyond the project config
#[derive(Debug, Clone, Default)]
pub struct StageTools {
    /// Documentation command, program first
    pub jsdoc_command: Vec<String>,

    /// Directory projects are deployed into
    pub deploy_root: Option<PathBuf>,
}

impl StageTools {
    /// Takes tools from the settings; an explicit deploy path wins
    pub fn from_settings(settings: &Settings, deploy_path: Option<PathBuf>) -> Self {
        Self {
            jsdoc_command: settings.jsdoc_argv(),
            deploy_root: deploy_path.or_else(|| settings.deploy_root()),
        }
    }
}

/// Returns the standard collaborators for a project
pub fn collaborators(config: &ProjectConfig, tools: StageTools) -> Collaborators<'_> {
    Collaborators {
        builder: Box::new(BuildStage::new(config)),
        tester: Box::new(TestStage::new(config)),
        documenter: Box::new(DocStage::new(config, tools.jsdoc_command)),
        deployer: Box::new(DeployStage::new(config, tools.deploy_root)),
        archiver: Box::new(ArchiveStage::new(config)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::storage::ProjectConfig;

    /// A `weather` 1.0.0 project rooted at `root`
    pub fn config(root: &Path) -> ProjectConfig {
        ProjectConfig {
            root: root.to_path_buf(),
            name: "weather".to_string(),
            version: "1.0.0".to_string(),
            project_type: "default".to_string(),
            minify_js: false,
            minify_css: false,
            js_name: "application".to_string(),
            build_path: root.join("build").join("weather"),
            test_path: None,
            test_name: None,
            should_build: true,
        }
    }

    pub fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }
}

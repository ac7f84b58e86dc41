use std::path::PathBuf;

use crate::pipeline::{Deployer, StageError};
use crate::storage::files;
use crate::storage::ProjectConfig;

/// Copies `build/<name>/` to `<deploy root>/<name>/`
pub struct DeployStage<'a> {
    config: &'a ProjectConfig,
    deploy_root: Option<PathBuf>,
}

impl<'a> DeployStage<'a> {
    pub fn new(config: &'a ProjectConfig, deploy_root: Option<PathBuf>) -> Self {
        Self {
            config,
            deploy_root,
        }
    }

    /// Returns where the project is deployed to, if a deploy root is known
    pub fn target(&self) -> Option<PathBuf> {
        self.deploy_root
            .as_ref()
            .map(|root| root.join(&self.config.name))
    }
}

impl Deployer for DeployStage<'_> {
    fn deploy_project(&mut self) -> Result<(), StageError> {
        let (Some(root), Some(target)) = (&self.deploy_root, self.target()) else {
            return Err(StageError::NoDeployTarget);
        };
        files::ensure_within(root, &target)?;

        let source = &self.config.build_path;
        if !source.is_dir() {
            return Err(StageError::MissingOutput(source.clone()));
        }

        files::copy_tree(source, &target)?;
        Ok(())
    }
}

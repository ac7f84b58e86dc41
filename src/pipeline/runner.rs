//! Stage execution
//!
//! Runs a planned pipeline in order and stops at the first failure. Stages
//! that already completed are kept; nothing is rolled back.

use std::path::PathBuf;

use serde::Serialize;

use super::collaborators::Collaborators;
use super::error::{StageError, StageFailure};
use crate::domain::{PipelinePlan, PlannedStage, Stage};
use crate::plugin::{Hook, ProjectPlugin};
use crate::storage::ProjectConfig;

/// A stage that ran to completion, hook included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub implicit: bool,

    /// What was produced, when it lives inside the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl StageOutcome {
    /// Returns the one-line confirmation for this stage
    pub fn message(&self) -> &'static str {
        match self.stage {
            Stage::Build => "Successfully built the project.",
            Stage::Document => "Successfully built the JSDoc documentation.",
            Stage::Test => "Successfully built the tests.",
            Stage::Deploy => "Successfully deployed the project.",
            Stage::Archive => "Successfully zipped the project.",
            Stage::Clean => "Successfully cleaned the project.",
            Stage::Scaffold => "Successfully created the project.",
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Completed stages in execution order
    pub completed: Vec<StageOutcome>,

    /// The stage that stopped the run
    pub failure: Option<StageFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Executes a pipeline plan against a set of collaborators
pub struct StageRunner<'r, 'a> {
    config: &'r ProjectConfig,
    collaborators: &'r mut Collaborators<'a>,
    plugin: Option<Box<dyn ProjectPlugin + 'a>>,
}

impl<'r, 'a> StageRunner<'r, 'a> {
    /// Creates a runner; the plugin must already have received the config
    pub fn new(
        config: &'r ProjectConfig,
        collaborators: &'r mut Collaborators<'a>,
        plugin: Option<Box<dyn ProjectPlugin + 'a>>,
    ) -> Self {
        Self {
            config,
            collaborators,
            plugin,
        }
    }

    /// Runs every planned stage in order, stopping at the first failure
    pub fn run(&mut self, plan: &PipelinePlan) -> RunReport {
        let mut report = RunReport::default();

        for planned in plan.stages() {
            match self.run_stage(planned, plan) {
                Ok(()) => report.completed.push(self.outcome(planned)),
                Err(error) => {
                    report.failure = Some(StageFailure {
                        stage: planned.stage,
                        implicit: planned.implicit,
                        error,
                    });
                    break;
                }
            }
        }

        report
    }

    fn run_stage(&mut self, planned: &PlannedStage, plan: &PipelinePlan) -> Result<(), StageError> {
        let collaborators = &mut *self.collaborators;
        match planned.stage {
            Stage::Build => collaborators.builder.build_project(&plan.restrictions)?,
            Stage::Document => collaborators.documenter.build_doc(plan.with_libs)?,
            Stage::Test => collaborators
                .tester
                .build_test(plan.test_name.as_deref())?,
            Stage::Deploy => collaborators.deployer.deploy_project()?,
            Stage::Archive => collaborators.archiver.zip_project()?,
            // Never part of a pipeline plan
            Stage::Clean | Stage::Scaffold => return Ok(()),
        }

        if let (Some(plugin), Some(hook)) = (self.plugin.as_mut(), Hook::after(planned.stage)) {
            if plugin.supports(hook) {
                plugin.run_hook(hook)?;
            }
        }

        Ok(())
    }

    fn outcome(&self, planned: &PlannedStage) -> StageOutcome {
        let output = match planned.stage {
            Stage::Build => Some(self.config.build_path.clone()),
            Stage::Document => Some(self.config.doc_path()),
            Stage::Test => self.config.test_path.clone(),
            Stage::Archive => Some(self.config.archive_path()),
            Stage::Deploy | Stage::Clean | Stage::Scaffold => None,
        };

        StageOutcome {
            stage: planned.stage,
            implicit: planned.implicit,
            output,
        }
    }
}

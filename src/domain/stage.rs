//! Pipeline stages and planning
//!
//! Maps command-line intent to an ordered stage plan. Deploy and archive
//! need build output, so each gets its own implicit build when neither an
//! explicit build nor a test stage is planned.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Nothing to do. Pass at least one of --build, --doc, --test, --deploy, --zip or --all.")]
    UnknownCommand,
}

impl PlanError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        "UnknownCommand"
    }
}

/// One pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Build,
    Document,
    Test,
    Deploy,
    Archive,
    Clean,
    Scaffold,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Build => "build",
            Stage::Document => "document",
            Stage::Test => "test",
            Stage::Deploy => "deploy",
            Stage::Archive => "archive",
            Stage::Clean => "clean",
            Stage::Scaffold => "scaffold",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset kinds a build can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Html,
    Js,
    Css,
    Img,
    Lib,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Html,
        AssetKind::Js,
        AssetKind::Css,
        AssetKind::Img,
        AssetKind::Lib,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Html => "html",
            AssetKind::Js => "js",
            AssetKind::Css => "css",
            AssetKind::Img => "img",
            AssetKind::Lib => "lib",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The asset kinds a build stage is limited to.
///
/// An empty set means no restriction: every kind is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions(BTreeSet<AssetKind>);

impl Restrictions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn only(kinds: impl IntoIterator<Item = AssetKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn insert(&mut self, kind: AssetKind) {
        self.0.insert(kind);
    }

    /// Returns true if no asset kind was singled out
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the build should process this kind
    pub fn allows(&self, kind: AssetKind) -> bool {
        self.0.is_empty() || self.0.contains(&kind)
    }

    /// Returns the kinds the build processes, in a fixed order
    pub fn kinds(&self) -> Vec<AssetKind> {
        AssetKind::ALL
            .into_iter()
            .filter(|kind| self.allows(*kind))
            .collect()
    }
}

/// Stage selection coming from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    /// `new <name> <type>`
    pub scaffold: Option<ScaffoldRequest>,
    pub clean: bool,
    pub build: bool,
    pub document: bool,
    pub with_libs: bool,
    /// `Some(None)` runs the whole suite, `Some(Some(name))` one sub-test
    pub test: Option<Option<String>>,
    pub deploy: bool,
    pub archive: bool,
    pub all: bool,
    pub restrictions: Restrictions,
}

/// A request to create a new project skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub name: String,
    pub project_type: String,
}

/// A stage placed in a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedStage {
    pub stage: Stage,

    /// Inserted because a later stage needs build output
    pub implicit: bool,
}

impl PlannedStage {
    fn explicit(stage: Stage) -> Self {
        Self {
            stage,
            implicit: false,
        }
    }

    fn implicit_build() -> Self {
        Self {
            stage: Stage::Build,
            implicit: true,
        }
    }
}

/// Ordered stages for one pipeline invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelinePlan {
    stages: Vec<PlannedStage>,
    pub restrictions: Restrictions,
    pub with_libs: bool,
    pub test_name: Option<String>,
}

impl PipelinePlan {
    /// Returns the planned stages in execution order
    pub fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    /// Returns true if the stage was requested explicitly
    pub fn requests(&self, stage: Stage) -> bool {
        self.stages
            .iter()
            .any(|planned| planned.stage == stage && !planned.implicit)
    }

    /// Returns true if any build, explicit or implicit, is planned
    pub fn builds(&self) -> bool {
        self.stages.iter().any(|planned| planned.stage == Stage::Build)
    }

    /// Returns true if an implicit build runs right before `stage`
    pub fn has_implicit_build_before(&self, stage: Stage) -> bool {
        self.stages.windows(2).any(|pair| {
            pair[0].stage == Stage::Build && pair[0].implicit && pair[1].stage == stage
        })
    }
}

/// The complete plan for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePlan {
    Scaffold(ScaffoldRequest),
    Clean,
    Pipeline(PipelinePlan),
}

/// Plans the stages for the given intent
pub fn plan(intent: &Intent) -> Result<StagePlan, PlanError> {
    if let Some(request) = &intent.scaffold {
        return Ok(StagePlan::Scaffold(request.clone()));
    }

    if intent.clean {
        return Ok(StagePlan::Clean);
    }

    let build = intent.build || intent.all;
    let document = intent.document || intent.all;
    let test = intent.test.is_some() || intent.all;
    let deploy = intent.deploy || intent.all;
    let archive = intent.archive || intent.all;

    if !(build || document || test || deploy || archive) {
        return Err(PlanError::UnknownCommand);
    }

    let needs_implicit_build = !build && !test;
    let mut stages = Vec::new();

    if build {
        stages.push(PlannedStage::explicit(Stage::Build));
    }
    if document {
        stages.push(PlannedStage::explicit(Stage::Document));
    }
    if test {
        stages.push(PlannedStage::explicit(Stage::Test));
    }
    if deploy {
        if needs_implicit_build {
            stages.push(PlannedStage::implicit_build());
        }
        stages.push(PlannedStage::explicit(Stage::Deploy));
    }
    if archive {
        if needs_implicit_build {
            stages.push(PlannedStage::implicit_build());
        }
        stages.push(PlannedStage::explicit(Stage::Archive));
    }

    Ok(StagePlan::Pipeline(PipelinePlan {
        stages,
        restrictions: intent.restrictions.clone(),
        with_libs: document && intent.with_libs,
        test_name: intent.test.clone().flatten().filter(|name| !name.is_empty()),
    }))
}

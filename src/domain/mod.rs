//! Domain models for kiln
//!
//! Stage planning and `//= require` resolution, without any stage side effects.

mod include;
mod stage;

pub use include::{parse_directive, IncludeError, InclusionGraph, InclusionResolver, Resolution};
pub use stage::{
    plan, AssetKind, Intent, PipelinePlan, PlanError, PlannedStage, Restrictions, ScaffoldRequest,
    Stage, StagePlan,
};

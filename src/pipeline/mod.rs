//! # Pipeline Execution
//!
//! Dispatches a [`PipelinePlan`](crate::domain::PipelinePlan) to the stage
//! collaborators and the project plugin.
//!
//! ## Key Types
//!
//! - [`StageRunner`] - Runs planned stages fail-fast and fires plugin hooks
//! - [`Collaborators`] - The boxed stage implementations a run dispatches to
//! - [`RunReport`] - Completed stages plus the first failure
//! - [`StageError`] - Why a stage did not complete

mod collaborators;
mod error;
mod runner;

pub use collaborators::{Archiver, Builder, Collaborators, Deployer, Documenter, Tester};
pub use error::{StageError, StageFailure};
pub use runner::{RunReport, StageOutcome, StageRunner};

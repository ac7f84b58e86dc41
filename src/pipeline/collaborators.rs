//! One trait per stage collaborator
//!
//! Concrete implementations live in [`crate::stages`] and take the validated
//! configuration at construction.

use crate::domain::Restrictions;

use super::StageError;

pub trait Builder {
    /// Builds the project, limited to the restricted asset kinds if any
    fn build_project(&mut self, restrictions: &Restrictions) -> Result<(), StageError>;
}

pub trait Tester {
    /// Builds the test bundle, or one named sub-test
    fn build_test(&mut self, test_name: Option<&str>) -> Result<(), StageError>;
}

pub trait Documenter {
    /// Generates documentation, including third-party libraries if asked
    fn build_doc(&mut self, with_libs: bool) -> Result<(), StageError>;
}

pub trait Deployer {
    fn deploy_project(&mut self) -> Result<(), StageError>;
}

pub trait Archiver {
    fn zip_project(&mut self) -> Result<(), StageError>;
}

/// The full set of collaborators a pipeline run dispatches to
pub struct Collaborators<'a> {
    pub builder: Box<dyn Builder + 'a>,
    pub tester: Box<dyn Tester + 'a>,
    pub documenter: Box<dyn Documenter + 'a>,
    pub deployer: Box<dyn Deployer + 'a>,
    pub archiver: Box<dyn Archiver + 'a>,
}

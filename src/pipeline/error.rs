use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{IncludeError, Stage};
use crate::plugin::PluginError;
use crate::storage::FsError;

/// Why a stage did not complete
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Include(#[from] IncludeError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Source folder not found: {}. Build the project first.", .0.display())]
    MissingOutput(PathBuf),

    #[error("No deploy path configured. Pass --deploy-path or set deploy_path in the settings file.")]
    NoDeployTarget,

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Could not minify {}: {message}", .path.display())]
    Minify { path: PathBuf, message: String },

    #[error("Could not write the archive {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },
}

impl StageError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Include(e) => e.kind(),
            StageError::Fs(e) => e.kind(),
            StageError::Plugin(e) => e.kind(),
            StageError::MissingOutput(_) => "SourceFileNotFound",
            StageError::NoDeployTarget => "ConfigMissingField",
            StageError::Tool { .. } => "ToolFailed",
            StageError::Minify { .. } => "MinifyFailed",
            StageError::Archive { .. } => "FileWriteFailed",
        }
    }
}

/// The first stage of a run that failed
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct StageFailure {
    pub stage: Stage,

    /// The failing stage was an implicit build
    pub implicit: bool,

    #[source]
    pub error: StageError,
}

impl StageFailure {
    /// Returns the kind of the underlying error
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn kinds_follow_the_wrapped_error() {
        let include = StageError::from(IncludeError::SourceFileNotFound {
            path: PathBuf::from("src/javascript/missing.js"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(include.kind(), "SourceFileNotFound");

        let fs = StageError::from(FsError::DirectoryCreate {
            path: PathBuf::from("build"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(fs.kind(), "DirectoryCreateFailed");

        assert_eq!(StageError::MissingOutput(PathBuf::from("build/weather")).kind(), "SourceFileNotFound");
        assert_eq!(
            StageError::Tool {
                tool: "jsdoc".into(),
                message: "exit status 1".into()
            }
            .kind(),
            "ToolFailed"
        );
    }

    #[test]
    fn failure_names_the_stage() {
        let failure = StageFailure {
            stage: Stage::Deploy,
            implicit: false,
            error: StageError::MissingOutput(PathBuf::from("build/weather")),
        };

        assert_eq!(failure.kind(), "SourceFileNotFound");
        assert_eq!(failure.to_string(), "deploy stage failed");
        assert!(std::error::Error::source(&failure)
            .unwrap()
            .to_string()
            .starts_with("Source folder not found"));
    }
}

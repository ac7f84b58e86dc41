//! Documentation build
//!
//! Delegates to an external JSDoc-compatible command:
//! `<command> src/javascript [src/lib] -r -d build/<name>_doc`

use std::process::Command;

use crate::pipeline::{Documenter, StageError};
use crate::storage::files;
use crate::storage::ProjectConfig;

pub struct DocStage<'a> {
    config: &'a ProjectConfig,
    command: Vec<String>,
}

impl<'a> DocStage<'a> {
    /// Creates the stage; `command` is the program followed by its arguments
    pub fn new(config: &'a ProjectConfig, command: Vec<String>) -> Self {
        Self { config, command }
    }
}

impl Documenter for DocStage<'_> {
    fn build_doc(&mut self, with_libs: bool) -> Result<(), StageError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(StageError::Tool {
                tool: "jsdoc".to_string(),
                message: "no documentation command configured".to_string(),
            });
        };

        let doc_path = self.config.doc_path();
        files::ensure_within(&self.config.output_root(), &doc_path)?;
        files::recreate_dir(&doc_path)?;

        let root = &self.config.root;
        let mut command = Command::new(program);
        command.args(args).arg(root.join("src").join("javascript"));
        if with_libs {
            command.arg(root.join("src").join("lib"));
        }
        command.arg("-r").arg("-d").arg(&doc_path).current_dir(root);

        let output = command.output().map_err(|e| StageError::Tool {
            tool: program.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StageError::Tool {
                tool: program.clone(),
                message: format!("{} {}", output.status, stderr.trim()).trim_end().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::stages::fixtures::{config, write};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A stand-in documentation tool that records its arguments
    fn fake_tool(dir: &std::path::Path, exit: i32) -> String {
        let path = dir.join("fake-jsdoc");
        let script = format!(
            "#!/bin/sh\necho \"$@\" > \"{}\"\nexit {}\n",
            dir.join("args.txt").display(),
            exit
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[test]
    fn runs_tool_with_sources_and_output_folder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "build/weather_doc/stale.html", "old");
        let tool = fake_tool(dir.path(), 0);

        let config = config(dir.path());
        DocStage::new(&config, vec![tool]).build_doc(false).unwrap();

        let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert!(args.contains("src/javascript -r -d"));
        assert!(args.trim_end().ends_with("build/weather_doc"));
        assert!(!args.contains("src/lib"));
        assert!(!dir.path().join("build/weather_doc/stale.html").exists());
    }

    #[test]
    fn with_libs_adds_the_library_folder() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(dir.path(), 0);

        let config = config(dir.path());
        DocStage::new(&config, vec![tool, "--private".to_string()])
            .build_doc(true)
            .unwrap();

        let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert!(args.starts_with("--private "));
        assert!(args.contains("src/lib -r -d"));
    }

    #[test]
    fn non_zero_exit_is_tool_failed() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(dir.path(), 3);

        let config = config(dir.path());
        let err = DocStage::new(&config, vec![tool]).build_doc(false).unwrap_err();

        assert_eq!(err.kind(), "ToolFailed");
    }

    #[test]
    fn missing_tool_is_tool_failed() {
        let dir = TempDir::new().unwrap();

        let config = config(dir.path());
        let err = DocStage::new(&config, vec!["kiln-no-such-jsdoc".to_string()])
            .build_doc(false)
            .unwrap_err();

        assert_eq!(err.kind(), "ToolFailed");
        assert!(err.to_string().starts_with("kiln-no-such-jsdoc failed"));
    }
}

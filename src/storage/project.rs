//! Project management
//!
//! Handles project scaffolding and cleaning, and provides access to the
//! config store and output locations.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::config::{ConfigStore, CONFIG_FILE};
use super::files::{self, FsError};
use crate::domain::ScaffoldRequest;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid project name or type '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidName(String),

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl ProjectError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectError::AlreadyExists(_) => "DirectoryCreateFailed",
            ProjectError::InvalidName(_) => "ConfigInvalidField",
            ProjectError::Fs(e) => e.kind(),
        }
    }
}

fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// A kiln project rooted at its working directory
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Opens the project at the given root
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a new project skeleton at `<parent>/<name>`
    pub fn scaffold(parent: &Path, request: &ScaffoldRequest) -> Result<Self, ProjectError> {
        let name = &request.name;
        for value in [name, &request.project_type] {
            if !is_valid_identifier(value) {
                return Err(ProjectError::InvalidName(value.clone()));
            }
        }

        let root = parent.join(name);
        if root.exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        for dir in [
            "src/javascript",
            "src/style",
            "src/assets",
            "src/lib",
            "test/javascript",
            "test/lib",
        ] {
            files::ensure_dir(&root.join(dir))?;
        }

        let config = format!(
            r#"// kiln project configuration
// Whole-line comments like this one are ignored.
{{
    "name": "{name}",
    "version": "0.1.0",
    "type": "{project_type}",
    // Compact the JavaScript bundle and minify stylesheets on build
    "minify_js": false,
    "minify_css": false,
    // Built bundle: build/{name}/javascript/<js_name>.js
    "js_name": "application"
}}
"#,
            name = name,
            project_type = request.project_type,
        );

        let index_html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{name}</title>
    <link rel="stylesheet" href="style/style.css">
</head>
<body>
    <script src="javascript/application.js"></script>
</body>
</html>
"#,
            name = name,
        );

        let test_html = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Tests</title>
</head>
<body>
    <script src="test.js"></script>
</body>
</html>
"#;

        let skeleton: [(&str, String); 7] = [
            (CONFIG_FILE, config),
            ("src/index.html", index_html),
            (
                "src/javascript/main.js",
                "// Application entry point.\n// Pull in other files with: //= require path/to/file\n".to_string(),
            ),
            ("src/style/style.css", "body {\n    margin: 0;\n}\n".to_string()),
            (
                "test/test.js",
                "// Test entry point. Files are looked up in test/javascript, then src/javascript.\n"
                    .to_string(),
            ),
            ("test/index.html", test_html.to_string()),
            (".gitignore", "build/\n".to_string()),
        ];

        for (relative, contents) in skeleton {
            files::write_file(&root.join(relative), contents)?;
        }

        Ok(Self::open(root))
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the config store for this project
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::for_project(&self.root)
    }

    /// Returns the directory holding all build outputs
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Returns the project-local plugins directory
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(".kiln").join("plugins")
    }

    /// Removes every build output; returns whether anything was removed
    pub fn clean(&self) -> Result<bool, FsError> {
        let build_dir = self.build_dir();
        let existed = build_dir.exists();
        files::remove_dir(&build_dir)?;
        Ok(existed)
    }
}

//! Project build
//!
//! Assembles `build/<name>/` from `src/`:
//!
//! | Kind | Source | Output |
//! |------|--------|--------|
//! | html | `src/*.html` | `*.html` |
//! | js | `src/javascript/main.js` and its requires | `javascript/<js_name>.js` |
//! | css | `src/style/` | `style/` |
//! | img | `src/assets/` | `assets/` |
//! | lib | `src/lib/` | `lib/` |
//!
//! A restricted build only replaces the outputs of the restricted kinds.

use std::path::{Path, PathBuf};

use super::minify::{compact_js, minify_css};
use crate::domain::{AssetKind, InclusionResolver, Restrictions};
use crate::pipeline::{Builder, StageError};
use crate::storage::files;
use crate::storage::ProjectConfig;

pub struct BuildStage<'a> {
    config: &'a ProjectConfig,
}

impl<'a> BuildStage<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    fn source(&self, relative: &str) -> PathBuf {
        self.config.root.join("src").join(relative)
    }

    fn output(&self, relative: &str) -> PathBuf {
        self.config.build_path.join(relative)
    }

    fn build_asset(&self, kind: AssetKind) -> Result<(), StageError> {
        match kind {
            AssetKind::Html => self.build_html(),
            AssetKind::Js => self.build_javascript(),
            AssetKind::Css => self.build_style(),
            AssetKind::Img => self.copy_folder("assets", "assets"),
            AssetKind::Lib => self.copy_folder("lib", "lib"),
        }
    }

    fn build_html(&self) -> Result<(), StageError> {
        let source = self.config.root.join("src");
        if !source.is_dir() {
            return Ok(());
        }

        for path in files::read_dir_sorted(&source, &self.config.build_path)? {
            if path.is_file() && has_extension(&path, "html") {
                if let Some(name) = path.file_name() {
                    files::copy_file(&path, &self.config.build_path.join(name))?;
                }
            }
        }
        Ok(())
    }

    fn build_javascript(&self) -> Result<(), StageError> {
        let entry = self.source("javascript").join("main.js");
        if !entry.is_file() {
            return Ok(());
        }

        let resolution = InclusionResolver::for_sources(&self.config.root).resolve(&entry)?;
        let mut bundle = resolution.bytes();
        if self.config.minify_js {
            bundle = compact_js(&bundle);
        }

        let dest = self.output("javascript");
        files::recreate_dir(&dest)?;
        files::write_file(&dest.join(format!("{}.js", self.config.js_name)), bundle)?;
        Ok(())
    }

    fn build_style(&self) -> Result<(), StageError> {
        let source = self.source("style");
        if !source.is_dir() {
            return Ok(());
        }

        let dest = self.output("style");
        files::copy_tree(&source, &dest)?;

        if self.config.minify_css {
            minify_stylesheets(&dest)?;
        }
        Ok(())
    }

    fn copy_folder(&self, from: &str, to: &str) -> Result<(), StageError> {
        let source = self.source(from);
        if !source.is_dir() {
            return Ok(());
        }

        files::copy_tree(&source, &self.output(to))?;
        Ok(())
    }
}

impl Builder for BuildStage<'_> {
    fn build_project(&mut self, restrictions: &Restrictions) -> Result<(), StageError> {
        files::ensure_within(&self.config.output_root(), &self.config.build_path)?;
        if restrictions.is_unrestricted() {
            files::recreate_dir(&self.config.build_path)?;
        } else {
            files::ensure_dir(&self.config.build_path)?;
        }

        for kind in restrictions.kinds() {
            self.build_asset(kind)?;
        }
        Ok(())
    }
}

fn minify_stylesheets(dir: &Path) -> Result<(), StageError> {
    for path in files::read_dir_sorted(dir, dir)? {
        if path.is_dir() {
            minify_stylesheets(&path)?;
        } else if has_extension(&path, "css") {
            let source = files::read_to_string(&path)?;
            let minified = minify_css(&path, &source)?;
            files::write_file(&path, minified)?;
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

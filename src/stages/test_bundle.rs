//! Test bundle build
//!
//! `test/test.js` (or `test/<name>.js` for a named sub-test) is resolved
//! against `test/javascript` first and `src/javascript` second, so tests can
//! require application code directly.

use std::path::PathBuf;

use crate::domain::InclusionResolver;
use crate::pipeline::{StageError, Tester};
use crate::storage::files;
use crate::storage::ProjectConfig;

pub struct TestStage<'a> {
    config: &'a ProjectConfig,
}

impl<'a> TestStage<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    fn output_dir(&self, test_name: Option<&str>) -> PathBuf {
        self.config.test_path.clone().unwrap_or_else(|| {
            self.config.output_root().join(format!(
                "{}_{}",
                self.config.name,
                test_name.unwrap_or("test")
            ))
        })
    }
}

impl Tester for TestStage<'_> {
    fn build_test(&mut self, test_name: Option<&str>) -> Result<(), StageError> {
        let root = &self.config.root;
        let out = self.output_dir(test_name);
        files::ensure_within(&self.config.output_root(), &out)?;
        files::recreate_dir(&out)?;

        let entry = root
            .join("test")
            .join(format!("{}.js", test_name.unwrap_or("test")));
        let resolution = InclusionResolver::for_tests(root).resolve(&entry)?;
        files::write_file(&out.join("test.js"), resolution.bytes())?;

        let libraries = root.join("test").join("lib");
        if libraries.is_dir() {
            files::copy_tree(&libraries, &out.join("lib"))?;
        }

        let page = root.join("test").join("index.html");
        if page.is_file() {
            files::copy_file(&page, &out.join("index.html"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::fixtures::{config, write};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn builds_suite_with_fallback_to_sources() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "test/test.js", "//= require helpers\n//= require model\nrun();\n");
        write(dir.path(), "test/javascript/helpers.js", "assert();\n");
        write(dir.path(), "src/javascript/model.js", "model();\n");
        write(dir.path(), "test/lib/qunit.js", "qunit");
        write(dir.path(), "test/index.html", "<html></html>");

        let mut config = config(dir.path());
        config.test_path = Some(dir.path().join("build").join("weather_test"));
        TestStage::new(&config).build_test(None).unwrap();

        let out = dir.path().join("build").join("weather_test");
        assert_eq!(
            fs::read_to_string(out.join("test.js")).unwrap(),
            "assert();\n\nmodel();\n\nrun();\n\n"
        );
        assert!(out.join("lib").join("qunit.js").is_file());
        assert!(out.join("index.html").is_file());
    }

    #[test]
    fn named_sub_test_uses_its_own_entry_and_folder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "test/test.js", "all();\n");
        write(dir.path(), "test/parser.js", "parser();\n");

        let config = config(dir.path());
        TestStage::new(&config).build_test(Some("parser")).unwrap();

        let out = dir.path().join("build").join("weather_parser");
        assert_eq!(fs::read_to_string(out.join("test.js")).unwrap(), "parser();\n\n");
        assert!(!out.join("index.html").exists());
    }

    #[test]
    fn missing_entry_fails_and_leaves_no_bundle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "build/weather_test/test.js", "stale");

        let config = config(dir.path());
        let err = TestStage::new(&config).build_test(None).unwrap_err();

        assert_eq!(err.kind(), "SourceFileNotFound");
        assert!(err.to_string().contains("test.js"));
        assert!(!dir.path().join("build/weather_test/test.js").exists());
    }

    #[test]
    fn sub_test_name_cannot_climb_out_of_build() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "test/test.js", "all();\n");
        write(dir.path(), "build/weather/index.html", "<html></html>");

        let config = config(dir.path());
        let err = TestStage::new(&config).build_test(Some("../..")).unwrap_err();

        assert_eq!(err.kind(), "DirectoryRemoveFailed");
        assert!(dir.path().join("test/test.js").is_file());
        assert!(dir.path().join("build/weather/index.html").is_file());
    }
}

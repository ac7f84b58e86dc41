//! CLI integration tests for kiln
//!
//! These tests drive the `kiln` binary from scaffolding through building,
//! testing, archiving and deploying a project.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the kiln binary, isolated from user settings
fn kiln_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("kiln"));
    cmd.current_dir(dir)
        .env("KILN_SETTINGS", dir.join("no-settings.toml"))
        .env_remove("KILN_DEPLOY_PATH");
    cmd
}

/// Create a temporary directory holding a scaffolded `weather` project
fn setup_project() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    kiln_cmd(dir.path())
        .args(["new", "weather", "default"])
        .assert()
        .success();
    let root = dir.path().join("weather");
    (dir, root)
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

// =============================================================================
// Scaffolding Tests
// =============================================================================

#[test]
fn test_new_creates_structure() {
    let dir = TempDir::new().unwrap();

    kiln_cmd(dir.path())
        .args(["new", "weather", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created the project with name weather."));

    let root = dir.path().join("weather");
    assert!(root.join("project.cfg").is_file());
    assert!(root.join("src/index.html").is_file());
    assert!(root.join("src/javascript/main.js").is_file());
    assert!(root.join("src/style/style.css").is_file());
    assert!(root.join("test/test.js").is_file());
    assert!(root.join("test/index.html").is_file());
}

#[test]
fn test_new_refuses_existing_directory() {
    let (dir, _root) = setup_project();

    kiln_cmd(dir.path())
        .args(["new", "weather", "default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [DirectoryCreateFailed]"));
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_no_stage_is_unknown_command() {
    let (_dir, root) = setup_project();

    kiln_cmd(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [UnknownCommand]"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();

    kiln_cmd(dir.path())
        .arg("--build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [ConfigNotFound]"));
}

#[test]
fn test_config_without_version_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "project.cfg", "// no version\n{\"name\": \"weather\"}\n");

    kiln_cmd(dir.path())
        .arg("--build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [ConfigMissingField]"));
}

#[test]
fn test_build_bundles_javascript() {
    let (_dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require util/dom\nstart();\n");
    write(&root, "src/javascript/util/dom.js", "function start() {}\n");

    kiln_cmd(&root)
        .arg("--build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully built the project."));

    let bundle = fs::read_to_string(root.join("build/weather/javascript/application.js")).unwrap();
    assert_eq!(bundle, "function start() {}\n\nstart();\n\n");
    assert!(root.join("build/weather/index.html").is_file());
    assert!(root.join("build/weather/style/style.css").is_file());
}

#[test]
fn test_missing_require_reports_path_and_writes_nothing() {
    let (_dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require nowhere\n");

    kiln_cmd(&root)
        .args(["--build", "--js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [SourceFileNotFound]"))
        .stderr(predicate::str::contains("nowhere.js"));

    assert!(!root.join("build/weather/javascript").exists());
}

#[test]
fn test_named_sub_test() {
    let (_dir, root) = setup_project();
    write(&root, "test/parser.js", "//= require model\nparse();\n");
    write(&root, "src/javascript/model.js", "model();\n");

    kiln_cmd(&root)
        .arg("--test=parser")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully built the tests."));

    let bundle = fs::read_to_string(root.join("build/weather_parser/test.js")).unwrap();
    assert_eq!(bundle, "model();\n\nparse();\n\n");
}

#[test]
fn test_zip_builds_first() {
    let (_dir, root) = setup_project();

    kiln_cmd(&root)
        .arg("--zip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully built the project."))
        .stdout(predicate::str::contains("Successfully zipped the project."));

    assert!(root.join("build/weather-0.1.0.zip").is_file());
}

#[test]
fn test_deploy_to_flag_path() {
    let (dir, root) = setup_project();
    let target = dir.path().join("www");

    kiln_cmd(&root)
        .arg("--deploy")
        .arg("--deploy-path")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully deployed the project."));

    assert!(target.join("weather/index.html").is_file());
}

#[test]
fn test_deploy_path_from_environment() {
    let (dir, root) = setup_project();
    let target = dir.path().join("www");

    kiln_cmd(&root)
        .arg("--deploy")
        .env("KILN_DEPLOY_PATH", &target)
        .assert()
        .success();

    assert!(target.join("weather/index.html").is_file());
}

#[test]
fn test_deploy_path_from_settings() {
    let (dir, root) = setup_project();
    let target = dir.path().join("from-settings");
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, format!("deploy_path = {:?}\n", target.display().to_string())).unwrap();

    kiln_cmd(&root)
        .arg("--deploy")
        .env("KILN_SETTINGS", &settings)
        .assert()
        .success();

    assert!(target.join("weather/index.html").is_file());
}

#[test]
fn test_failed_stage_stops_the_pipeline() {
    let (dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require nowhere\n");
    let target = dir.path().join("www");

    kiln_cmd(&root)
        .args(["--build", "--deploy", "--zip"])
        .arg("--deploy-path")
        .arg(&target)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Successfully").not())
        .stderr(predicate::str::contains("build stage failed"));

    assert!(!target.exists());
    assert!(!root.join("build/weather-0.1.0.zip").exists());
}

#[test]
fn test_json_output() {
    let (_dir, root) = setup_project();

    let output = kiln_cmd(&root)
        .args(["--build", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let line = String::from_utf8(output.stdout).unwrap();
    let json: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["stage"], "build");
    assert_eq!(json["implicit"], false);
}

#[test]
fn test_name_outside_build_folder_is_refused() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "project.cfg", "{\"name\": \"..\", \"version\": \"1\"}\n");
    write(dir.path(), "src/precious.js", "keep();\n");
    write(dir.path(), "build/old.txt", "old");

    kiln_cmd(dir.path())
        .arg("--build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [DirectoryRemoveFailed]"));

    assert!(dir.path().join("src/precious.js").is_file());
    assert!(dir.path().join("project.cfg").is_file());
    assert!(dir.path().join("build/old.txt").is_file());
}

#[test]
fn test_sub_test_name_outside_build_folder_is_refused() {
    let (_dir, root) = setup_project();

    kiln_cmd(&root)
        .arg("--test=../..")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [DirectoryRemoveFailed]"));

    assert!(root.join("project.cfg").is_file());
    assert!(root.join("test/test.js").is_file());
}

#[test]
fn test_latin1_sources_are_bundled_byte_for_byte() {
    let (_dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require legacy\nstart();\n");
    fs::write(root.join("src/javascript/legacy.js"), b"var s = '\xe9t\xe9';\n").unwrap();

    kiln_cmd(&root).args(["--build", "--js"]).assert().success();

    let bundle = fs::read(root.join("build/weather/javascript/application.js")).unwrap();
    assert_eq!(bundle, b"var s = '\xe9t\xe9';\n\nstart();\n\n".to_vec());
}

#[test]
fn test_unknown_type_without_plugin_fails() {
    let dir = TempDir::new().unwrap();
    kiln_cmd(dir.path())
        .args(["new", "weather", "no-such-widget-type"])
        .assert()
        .success();
    let root = dir.path().join("weather");

    kiln_cmd(&root)
        .arg("--build")
        .env("PATH", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [PluginNotFound]"));

    assert!(!root.join("build").exists());
}

// =============================================================================
// Clean Tests
// =============================================================================

#[test]
fn test_clean_removes_build() {
    let (_dir, root) = setup_project();
    kiln_cmd(&root).arg("--build").assert().success();
    assert!(root.join("build").is_dir());

    kiln_cmd(&root)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully cleaned the project."));

    assert!(!root.join("build").exists());
}

#[test]
fn test_clean_conflicts_with_stage_flags() {
    let (_dir, root) = setup_project();

    kiln_cmd(&root).args(["--build", "clean"]).assert().failure();
}

// =============================================================================
// Deps Tests
// =============================================================================

#[test]
fn test_deps_lists_files_in_order() {
    let (_dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require a\n//= require b\n");
    write(&root, "src/javascript/a.js", "//= require b\n");
    write(&root, "src/javascript/b.js", "b();\n");

    let output = kiln_cmd(&root)
        .args(["deps", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files: Vec<&str> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert_eq!(
        files,
        vec!["src/javascript/main.js", "src/javascript/a.js", "src/javascript/b.js"]
    );
    assert_eq!(json["cycle"], false);
}

#[test]
fn test_deps_reports_cycles() {
    let (_dir, root) = setup_project();
    write(&root, "src/javascript/main.js", "//= require a\n");
    write(&root, "src/javascript/a.js", "//= require main\n");

    kiln_cmd(&root)
        .arg("deps")
        .assert()
        .success()
        .stdout(predicate::str::contains("contains a cycle"));
}

// =============================================================================
// Plugin Tests
// =============================================================================

#[test]
fn test_plugin_list_empty() {
    let dir = TempDir::new().unwrap();

    kiln_cmd(dir.path())
        .args(["plugin", "list"])
        .env("PATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins found"));
}

#[cfg(unix)]
#[test]
fn test_project_plugin_hooks_run() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    kiln_cmd(dir.path())
        .args(["new", "weather", "widget"])
        .assert()
        .success();
    let root = dir.path().join("weather");

    let plugin = root.join(".kiln/plugins/kiln-widget");
    let log = root.join("hooks.log");
    write(
        &root,
        ".kiln/plugins/kiln-widget",
        &format!(
            r#"#!/bin/sh
if [ "$1" = "--manifest" ]; then
  echo '{{"name": "kiln-widget", "version": "0.1.0", "operations": ["after_build", "after_archive"]}}'
  exit 0
fi
read line
case "$line" in
  *after_build*) echo build >> "{log}" ;;
  *after_archive*) echo archive >> "{log}" ;;
esac
echo '{{"success": true}}'
"#,
            log = log.display()
        ),
    );
    fs::set_permissions(&plugin, fs::Permissions::from_mode(0o755)).unwrap();

    kiln_cmd(&root)
        .args(["--build", "--zip"])
        .env("PATH", "/usr/bin:/bin")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&log).unwrap(), "build\narchive\n");

    // after_test is not in the manifest
    kiln_cmd(&root)
        .arg("--test")
        .env("PATH", "/usr/bin:/bin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully built the tests."));

    assert_eq!(fs::read_to_string(&log).unwrap(), "build\narchive\n");
}

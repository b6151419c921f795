//! CLI integration tests for Lookout.
//!
//! These tests run the binary against throwaway prefixes so nothing from
//! the host system leaks into resolution.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the lookout binary command, isolated from the host environment.
fn lookout(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lookout").unwrap();
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("PKG_CONFIG_PATH")
        .env_remove("LOOKOUT_PREFIX_PATH")
        .env_remove("VCPKG_ROOT");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn install_zlib(prefix: &Path) {
    write(
        &prefix.join("lib/lookout/zlib/zlib-config.toml"),
        r#"
[package]
name = "zlib"
prefix = "../../.."

[[target]]
name = "ZLIB::ZLIB"
include-dirs = ["include"]
link = ["lib/libz.a"]
"#,
    );
}

const MANIFEST: &str = r#"
[project]
name = "mylib"
version = "2.1.0"

[dependencies]
third-party = ["zlib"]

[[target]]
name = "mylib"
kind = "library"
sources = ["src/lib.c"]
"#;

// ============================================================================
// lookout resolve
// ============================================================================

#[test]
fn test_resolve_finds_package_config() {
    let tmp = temp_dir();
    let prefix = tmp.path().join("prefix");
    install_zlib(&prefix);

    lookout(tmp.path())
        .args(["resolve", "zlib", "--no-default-paths", "--prefix"])
        .arg(&prefix)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("zlib -> zlib::zlib"))
        .stderr(predicate::str::contains("package-manager"));
}

#[test]
fn test_resolve_json_report() {
    let tmp = temp_dir();
    let prefix = tmp.path().join("prefix");
    install_zlib(&prefix);

    let output = lookout(tmp.path())
        .args(["--json", "resolve", "zlib", "ZLIB::ZLIB", "--no-default-paths", "--prefix"])
        .arg(&prefix)
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["packages"][0]["resolution"]["outcome"], "target");
    assert_eq!(
        report["packages"][1]["resolution"]["found"]["strategy"],
        "fast-path"
    );
    assert_eq!(report["found"]["ZLIB_FOUND"], true);
}

#[test]
fn test_resolve_required_missing_fails() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .args(["resolve", "nosuchlib", "--no-default-paths"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`nosuchlib`"))
        .stderr(predicate::str::contains("could not be found"));
}

#[test]
fn test_resolve_optional_missing_succeeds() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .args(["resolve", "nosuchlib", "--optional", "--no-default-paths"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Missing"));
}

#[test]
fn test_resolve_rejects_invalid_name() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .args(["resolve", "a::b::c", "--no-default-paths"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid package name"));
}

// ============================================================================
// lookout configure
// ============================================================================

#[test]
fn test_configure_writes_resolution_report() {
    let tmp = temp_dir();
    let prefix = tmp.path().join("prefix");
    let project = tmp.path().join("project");
    install_zlib(&prefix);
    write(&project.join("Lookout.toml"), MANIFEST);

    lookout(tmp.path())
        .args(["configure", "--no-default-paths", "--prefix"])
        .arg(&prefix)
        .current_dir(&project)
        .assert()
        .success();

    let report = fs::read_to_string(project.join(".lookout/resolution.json")).unwrap();
    assert!(report.contains("\"ZLIB_FOUND\": true"));
}

#[test]
fn test_configure_without_manifest_fails() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .arg("configure")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find Lookout.toml"));
}

// ============================================================================
// lookout export / uninstall-script
// ============================================================================

#[test]
fn test_export_then_resolve_from_stage() {
    let tmp = temp_dir();
    let project = tmp.path().join("project");
    let stage = tmp.path().join("stage");
    write(&project.join("Lookout.toml"), MANIFEST);

    lookout(tmp.path())
        .args(["export", "--enable", "shared", "--install-prefix"])
        .arg(&stage)
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("mylib::static, mylib::shared"));

    assert!(stage.join("lib/lookout/mylib/mylib-config.toml").is_file());
    let version =
        fs::read_to_string(stage.join("lib/lookout/mylib/mylib-config-version.toml")).unwrap();
    assert!(version.contains("version = \"2.1.0\""));
    assert!(version.contains("same-major"));

    lookout(tmp.path())
        .args(["resolve", "mylib", "--no-default-paths", "--prefix"])
        .arg(&stage)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("mylib -> mylib::mylib"));
}

#[test]
fn test_uninstall_script_lists_exported_files() {
    let tmp = temp_dir();
    let project = tmp.path().join("project");
    let stage = tmp.path().join("stage");
    write(&project.join("Lookout.toml"), MANIFEST);

    lookout(tmp.path())
        .args(["export", "--install-prefix"])
        .arg(&stage)
        .current_dir(&project)
        .assert()
        .success();

    lookout(tmp.path())
        .args(["uninstall-script", "--stdout"])
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/bin/sh"))
        .stdout(predicate::str::contains("mylib-config.toml'"))
        .stdout(predicate::str::contains("mylib-config-version.toml'"));

    lookout(tmp.path())
        .arg("uninstall-script")
        .current_dir(&project)
        .assert()
        .success();
    assert!(project.join(".lookout/uninstall.sh").is_file());
}

#[test]
fn test_uninstall_script_without_manifest_fails() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .arg("uninstall-script")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("install manifest not found"));
}

// ============================================================================
// lookout completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    lookout(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lookout"));
}

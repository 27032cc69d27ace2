//! Integration tests for `depstrap resolve`.

use anyhow::Result;
use depstrap::test_utils::ManifestFixture;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_resolve_text_output() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;

    project
        .depstrap()
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("app 1.0 (3 dependencies)"))
        .stdout(predicate::str::contains("gmock 1.7.0"))
        .stdout(predicate::str::contains("gtest 1.7.0"))
        .stdout(predicate::str::contains("glog 0.3.3"));
    Ok(())
}

#[test]
fn test_resolve_json_output() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;

    let output = project.depstrap().args(["resolve", "--format", "json"]).output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["root"]["name"], "app");
    assert_eq!(json["matched"], 0);
    let names: Vec<&str> = json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["gmock", "glog", "gtest"]);
    Ok(())
}

#[test]
fn test_resolve_with_project_dir_flag() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;

    project
        .depstrap()
        .current_dir(project.deps_path())
        .arg("-C")
        .arg(project.project_path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("gmock"));
    Ok(())
}

#[test]
fn test_version_conflict_exits_with_error() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::version_conflict().write_to(project.project_path())?;

    project
        .depstrap()
        .arg("resolve")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Version mismatch for kj: 0.5.3 vs 0.6.1"));
    Ok(())
}

#[test]
fn test_diamond_exits_with_cycle_error() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::diamond().write_to(project.project_path())?;

    project
        .depstrap()
        .arg("resolve")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cyclic dependency detected for B"));
    Ok(())
}

#[test]
fn test_missing_manifest() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depstrap()
        .arg("resolve")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Manifest not found"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_malformed_manifest() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::missing_version().write_to(project.project_path())?;

    project
        .depstrap()
        .arg("resolve")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed manifest"));

    ManifestFixture::invalid_syntax().write_to(project.project_path())?;
    project.depstrap().arg("resolve").assert().code(1).stderr(predicate::str::contains("Malformed manifest"));
    Ok(())
}

#[test]
fn test_missing_explicit_config() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;

    project
        .depstrap()
        .args(["--config", "does-not-exist.toml", "resolve"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
    Ok(())
}

//! Integration tests for `depstrap status`.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_status_lifecycle() -> Result<()> {
    let project = TestProject::new()?;
    let dir = project.deps_path().join("gtest-1.8");

    project.depstrap().arg("status").arg("init").arg(&dir).assert().success();
    project.depstrap().arg("status").arg("show").arg(&dir).assert().success().stdout("failure\n");

    project.depstrap().arg("status").arg("success").arg(&dir).assert().success();
    project.depstrap().arg("status").arg("show").arg(&dir).assert().success().stdout("success\n");

    project.depstrap().arg("status").arg("failure").arg(&dir).assert().success();
    project.depstrap().arg("status").arg("show").arg(&dir).assert().success().stdout("failure\n");
    Ok(())
}

#[test]
fn test_show_missing_marker() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depstrap()
        .arg("status")
        .arg("show")
        .arg(project.deps_path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Build status unavailable"));
    Ok(())
}

#[test]
fn test_show_tolerates_hand_edited_marker() -> Result<()> {
    let project = TestProject::new()?;
    std::fs::write(project.deps_path().join("build.status"), "  SUCCESS  \n\n")?;

    project
        .depstrap()
        .arg("status")
        .arg("show")
        .arg(project.deps_path())
        .assert()
        .success()
        .stdout("success\n");
    Ok(())
}

//! Integration tests for `depstrap check`.

use anyhow::Result;
use predicates::prelude::*;
use std::path::Path;

use crate::common::TestProject;

fn touch(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path.parent().unwrap())?;
    std::fs::write(path, "")?;
    Ok(())
}

#[test]
fn test_complete_installation() -> Result<()> {
    let project = TestProject::new()?;
    let prefix = project.deps_path().join("asio");
    touch(&prefix.join("include/asio.hpp"))?;
    touch(&prefix.join("lib/libasio.so"))?;
    touch(&prefix.join("lib/libasio.a"))?;

    project
        .depstrap()
        .args(["check", "asio", "--prefix"])
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("Asio installation at"));
    Ok(())
}

#[test]
fn test_missing_header() -> Result<()> {
    let project = TestProject::new()?;
    let prefix = project.deps_path().join("asio");
    touch(&prefix.join("lib/libasio.so"))?;

    project
        .depstrap()
        .args(["check", "asio", "--prefix"])
        .arg(&prefix)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Asio header is not readable"));
    Ok(())
}

#[test]
fn test_unknown_tool() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depstrap()
        .args(["check", "boost", "--prefix"])
        .arg(project.deps_path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No tool is registered for dependency 'boost'"));
    Ok(())
}

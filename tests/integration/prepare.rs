//! Integration tests for the prepare phase, bootstrapping through a `file://` mirror.

// Fake builds run through `sh`
#![cfg(unix)]

use anyhow::Result;
use depstrap::bootstrap::BootstrapOptions;
use depstrap::prepare::PrepareContext;
use depstrap::status::BuildStatus;
use depstrap::test_utils::init_test_logging;
use depstrap::tools;
use predicates::prelude::*;

use crate::common::{FAKE_BUILD, TestProject};

const WSCRIPT: (&str, &str) = ("wscript", "def build(ctx): pass\n");

#[test]
fn test_prepare_bootstraps_from_mirror() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        r#"{"product": "app", "version": "1.0", "dependencies": [{"product": "gtest", "version": "1.8"}]}"#,
    )?;
    project.mirror().publish(tools::lookup("gtest")?, "1.8", &[WSCRIPT])?;

    project
        .depstrap()
        .arg("prepare")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ gtest"))
        .stdout(predicate::str::contains("bin:"));

    let product_path = project.deps_path().join("gtest-1.8");
    assert!(product_path.join("wscript").is_file(), "archive was flattened into the product path");
    assert!(BuildStatus::load(&product_path)?.is_success()?);
    Ok(())
}

#[test]
fn test_prepare_with_nothing_to_do() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(r#"{"product": "app", "version": "1.0"}"#)?;

    project
        .depstrap()
        .arg("prepare")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependencies to prepare"));
    Ok(())
}

#[test]
fn test_prepare_unknown_tool_suggests_name() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(r#"{"product": "app", "version": "1.0"}"#)?;

    project
        .depstrap()
        .args(["prepare", "gtets"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No tool is registered for dependency 'gtets'"))
        .stderr(predicate::str::contains("Did you mean 'gtest'?"));
    Ok(())
}

#[test]
fn test_failed_build_reports_exit_code() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("exit 7")?;
    project.write_manifest(
        r#"{"product": "app", "version": "1.0", "dependencies": [{"product": "zeromq", "version": "4.0.4"}]}"#,
    )?;
    project.mirror().publish(tools::lookup("zeromq")?, "4.0.4", &[WSCRIPT])?;

    project
        .depstrap()
        .arg("prepare")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ZeroMQ preparation failed: build exited with 7"));

    let product_path = project.deps_path().join("zeromq-4.0.4");
    assert!(BuildStatus::load(&product_path)?.is_failure()?);
    Ok(())
}

#[test]
fn test_missing_archive_fails_after_retries() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        r#"{"product": "app", "version": "1.0", "dependencies": [{"product": "enet", "version": "1.3.13"}]}"#,
    )?;

    project
        .depstrap()
        .arg("prepare")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("after 2 attempt(s)"));
    Ok(())
}

#[tokio::test]
async fn test_local_checkout_is_built_in_place() -> Result<()> {
    init_test_logging(None);
    let project = TestProject::new()?;
    project.write_manifest(
        r#"{"product": "app", "version": "1.0", "dependencies": [{"product": "glog", "version": "0.3.3"}]}"#,
    )?;
    let checkout = project.create_local_dependency("vendor/glog", "glog", "0.3.3")?;
    std::fs::write(checkout.join("wscript"), "")?;

    let options = BootstrapOptions {
        build_command: vec!["sh".into(), "-c".into(), FAKE_BUILD.into()],
        max_attempts: 1,
        ..BootstrapOptions::new(project.deps_path())
    };
    let mut context = PrepareContext::from_project(project.project_path(), options)?;

    assert_eq!(context.load_all().await?, 1);
    assert_eq!(context.installed()["glog"].lib, checkout.join("lib"));
    assert!(!project.deps_path().join("glog-0.3.3").exists());
    Ok(())
}

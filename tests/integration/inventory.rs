//! Integration tests for local inventory matching.

use anyhow::Result;
use depstrap::manifest::{self, Product};
use depstrap::resolver::{self, LocalInventory};
use depstrap::test_utils::ManifestFixture;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_resolve_reports_local_checkouts() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;
    let gtest = project.create_local_dependency("third_party/gtest", "gtest", "1.7.0")?;
    project.create_local_dependency("third_party/glog", "glog", "0.3.4")?;

    let output = project.depstrap().args(["resolve", "--format", "json"]).output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(json["matched"], 1);
    let products = json["products"].as_array().unwrap();
    let located: Vec<(&str, &str)> = products
        .iter()
        .filter_map(|p| Some((p["name"].as_str()?, p["source_location"].as_str()?)))
        .collect();
    let expected = gtest.join("dependency.json");
    assert_eq!(located, vec![("gtest", expected.to_str().unwrap())]);
    Ok(())
}

#[test]
fn test_dep_base_dir_flag_overrides_config() -> Result<()> {
    let project = TestProject::new()?;
    ManifestFixture::basic().write_to(project.project_path())?;
    ManifestFixture::leaf("glog", "0.3.3").write_to(&project.project_path().join("vendored/glog"))?;

    project
        .depstrap()
        .args(["resolve", "--dep-base-dir", "vendored"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vendored"));
    Ok(())
}

#[test]
fn test_broken_manifests_do_not_stop_matching() -> Result<()> {
    let temp = tempfile::tempdir()?;
    ManifestFixture::invalid_syntax().write_to(&temp.path().join("a_broken"))?;
    ManifestFixture::leaf("gtest", "1.8").write_to(&temp.path().join("b_gtest"))?;

    let inventory = LocalInventory::scan(temp.path());
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory.locate("gtest", "1.8"), Some(temp.path().join("b_gtest/dependency.json").as_path()));
    Ok(())
}

#[test]
fn test_library_workflow() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let manifest_path = ManifestFixture::basic().write_to(&temp.path().join("app"))?;
    ManifestFixture::leaf("glog", "0.3.3").write_to(&temp.path().join("deps/glog"))?;

    let root = manifest::parse_file(&manifest_path)?;
    assert_eq!(root.source_location.as_deref(), Some(manifest_path.as_path()));

    let mut directory = resolver::resolve(&root)?;
    assert_eq!(resolver::match_local(&temp.path().join("deps"), &mut directory), 1);

    let glog: &Product = directory.find("glog")?;
    assert_eq!(glog.source_dir(), Some(temp.path().join("deps/glog").as_path()));
    assert!(directory.find("gmock")?.source_location.is_none());
    Ok(())
}

//! Shared helpers for the integration suite.

#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use depstrap::test_utils::MirrorFixture;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build command used in place of waf: produces every install tree.
pub const FAKE_BUILD: &str = "mkdir -p bin include lib";

/// A project directory with its own dependency base directory, bootstrap mirror and
/// config file, all inside one temporary directory.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    deps_dir: PathBuf,
    mirror: MirrorFixture,
    config_path: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let deps_dir = temp_dir.path().join("deps");
        let mirror_dir = temp_dir.path().join("mirror");
        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&deps_dir)?;
        fs::create_dir_all(&mirror_dir)?;

        let project = Self {
            config_path: temp_dir.path().join("config.toml"),
            mirror: MirrorFixture::new(mirror_dir),
            _temp_dir: temp_dir,
            project_dir,
            deps_dir,
        };
        project.write_config(FAKE_BUILD)?;
        Ok(project)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn deps_path(&self) -> &Path {
        &self.deps_dir
    }

    pub fn mirror(&self) -> &MirrorFixture {
        &self.mirror
    }

    /// Rewrite the config file with `build_script` as the build command.
    pub fn write_config(&self, build_script: &str) -> Result<()> {
        let content = format!(
            "dep_base_dir = {:?}\nbootstrap_url_base = {:?}\nmax_download_attempts = 2\nbuild_command = [\"sh\", \"-c\", {:?}]\n",
            self.deps_dir.display().to_string(),
            self.mirror.url_base()?,
            build_script,
        );
        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config to {}", self.config_path.display()))
    }

    pub fn write_manifest(&self, content: &str) -> Result<()> {
        let manifest_path = self.project_dir.join("dependency.json");
        fs::write(&manifest_path, content)
            .with_context(|| format!("Failed to write manifest to {}", manifest_path.display()))
    }

    /// Write a manifest for a dependency already checked out under the base directory.
    pub fn create_local_dependency(&self, dir: &str, product: &str, version: &str) -> Result<PathBuf> {
        let path = self.deps_dir.join(dir);
        fs::create_dir_all(&path)?;
        fs::write(
            path.join("dependency.json"),
            format!(r#"{{"product": "{product}", "version": "{version}"}}"#),
        )?;
        Ok(path)
    }

    /// A `depstrap` invocation isolated from the user's environment.
    pub fn depstrap(&self) -> Command {
        let mut cmd = Command::cargo_bin("depstrap").expect("depstrap binary is built");
        cmd.current_dir(&self.project_dir)
            .env("DEPSTRAP_CONFIG_PATH", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

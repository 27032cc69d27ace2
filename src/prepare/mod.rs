//! The prepare phase.
//!
//! A [`PrepareContext`] owns the resolved [`ProductDirectory`] of one project and
//! loads each dependency's tool into it. Loading a tool looks its product up by name
//! and bootstraps it; every tool is loaded at most once per context, no matter how
//! many times it is requested.
//!
//! ```rust,no_run
//! use depstrap::bootstrap::BootstrapOptions;
//! use depstrap::prepare::PrepareContext;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = BootstrapOptions::new("/opt/deps");
//! let mut context = PrepareContext::from_project(Path::new("."), options)?;
//!
//! context.load("gtest").await?;
//! context.load("gmock").await?;
//! for (name, paths) in context.installed() {
//!     println!("{name}: {}", paths.include.display());
//! }
//! # Ok(())
//! # }
//! ```

use crate::bootstrap::{Bootstrap, BootstrapOptions};
use crate::manifest;
use crate::resolver::{self, ProductDirectory};
use crate::tools::{self, InstalledPaths};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Per-project state of one prepare phase.
#[derive(Debug)]
pub struct PrepareContext {
    directory: ProductDirectory,
    options: BootstrapOptions,
    loaded: HashSet<String>,
    installed: BTreeMap<String, InstalledPaths>,
}

impl PrepareContext {
    pub fn new(directory: ProductDirectory, options: BootstrapOptions) -> Self {
        Self {
            directory,
            options,
            loaded: HashSet::new(),
            installed: BTreeMap::new(),
        }
    }

    /// Parse the project's manifest, resolve it and match the result against the
    /// dependency base directory.
    pub fn from_project(project_dir: &Path, options: BootstrapOptions) -> Result<Self> {
        let manifest_path = manifest::find_manifest(project_dir)?;
        let root = manifest::parse_file(&manifest_path)?;
        let mut directory = resolver::resolve(&root)
            .with_context(|| format!("Failed to resolve dependencies of {}", manifest_path.display()))?;

        let matched = resolver::match_local(&options.dep_base_dir, &mut directory);
        debug!(matched, base_dir = %options.dep_base_dir.display(), "Matched local dependencies");

        Ok(Self::new(directory, options))
    }

    pub fn directory(&self) -> &ProductDirectory {
        &self.directory
    }

    pub fn options(&self) -> &BootstrapOptions {
        &self.options
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Install trees of every tool prepared so far, by name.
    pub fn installed(&self) -> &BTreeMap<String, InstalledPaths> {
        &self.installed
    }

    /// Load a tool, bootstrapping its dependency if the project needs it.
    ///
    /// Returns `true` when this call ran the tool's bootstrap. Tools already loaded
    /// by this context, and tools whose product is not in the directory, return
    /// `false` without doing anything.
    ///
    /// # Errors
    ///
    /// [`crate::core::DepstrapError::UnknownTool`] for names outside the registry,
    /// plus any failure of the bootstrap itself.
    pub async fn load(&mut self, name: &str) -> Result<bool> {
        let tool = tools::lookup(name)?;
        if !self.loaded.insert(name.to_string()) {
            debug!(tool = name, "Tool already loaded");
            return Ok(false);
        }
        if !self.directory.contains(name) {
            debug!(tool = name, "Not a dependency of this project, skipping");
            return Ok(false);
        }

        let product = self.directory.find(name)?;
        let paths = Bootstrap::new(tool, product, &self.options).run(&self.options).await?;
        self.installed.insert(name.to_string(), paths);
        Ok(true)
    }

    /// Load every known tool the directory contains, in discovery order.
    ///
    /// Returns how many tools were bootstrapped. Products without a registered tool
    /// are left alone.
    pub async fn load_all(&mut self) -> Result<usize> {
        let names: Vec<String> = self
            .directory
            .names()
            .into_iter()
            .filter(|name| tools::KNOWN_TOOLS.contains(name))
            .map(str::to_string)
            .collect();

        let mut count = 0;
        for name in &names {
            if self.load(name).await? {
                count += 1;
            }
        }
        info!(count, total = self.directory.len(), "Prepared dependencies");
        Ok(count)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::constants::STATUS_FILE_NAME;
    use crate::core::DepstrapError;
    use crate::manifest::Product;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Build script that counts its runs and produces the install trees.
    const COUNTING_BUILD: &str = "echo run >> runs.log && mkdir -p bin include lib";

    fn options(base: &Path) -> BootstrapOptions {
        BootstrapOptions {
            build_command: vec!["sh".to_string(), "-c".to_string(), COUNTING_BUILD.to_string()],
            ..BootstrapOptions::new(base)
        }
    }

    fn context(base: &Path, deps: Vec<Product>) -> PrepareContext {
        for product in &deps {
            let path = base.join(format!("{}-{}", product.name, product.version));
            std::fs::create_dir_all(&path).unwrap();
            std::fs::write(path.join("wscript"), "").unwrap();
        }
        let root = Product::new("app", "1.0").with_dependencies(deps);
        PrepareContext::new(resolver::resolve(&root).unwrap(), options(base))
    }

    fn runs(path: PathBuf) -> usize {
        std::fs::read_to_string(path.join("runs.log")).map(|s| s.lines().count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_tool_is_loaded_once() {
        let temp = tempdir().unwrap();
        let mut ctx = context(temp.path(), vec![Product::new("gtest", "1.8")]);
        let gtest_dir = temp.path().join("gtest-1.8");

        assert!(ctx.load("gtest").await.unwrap());
        // Forget the successful build so a second bootstrap would be visible
        std::fs::remove_file(gtest_dir.join(STATUS_FILE_NAME)).unwrap();

        assert!(!ctx.load("gtest").await.unwrap());
        assert_eq!(runs(gtest_dir), 1);
        assert!(ctx.is_loaded("gtest"));
        assert_eq!(ctx.installed()["gtest"].bin, Some(temp.path().join("gtest-1.8/bin")));
    }

    #[tokio::test]
    async fn test_contexts_do_not_share_state() {
        let temp = tempdir().unwrap();
        let gtest_dir = temp.path().join("gtest-1.8");

        let mut first = context(temp.path(), vec![Product::new("gtest", "1.8")]);
        first.load("gtest").await.unwrap();
        std::fs::remove_file(gtest_dir.join(STATUS_FILE_NAME)).unwrap();

        let mut second = context(temp.path(), vec![Product::new("gtest", "1.8")]);
        assert!(second.load("gtest").await.unwrap());
        assert_eq!(runs(gtest_dir), 2);
    }

    #[tokio::test]
    async fn test_tool_not_needed_is_skipped() {
        let temp = tempdir().unwrap();
        let mut ctx = context(temp.path(), vec![Product::new("gtest", "1.8")]);

        assert!(!ctx.load("protobuf").await.unwrap());
        assert!(ctx.installed().is_empty());
        assert!(!temp.path().join("protobuf-3.0").exists());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let temp = tempdir().unwrap();
        let mut ctx = context(temp.path(), Vec::new());

        let err = ctx.load("boost").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepstrapError>(),
            Some(DepstrapError::UnknownTool { name }) if name == "boost"
        ));
        assert!(!ctx.is_loaded("boost"));
    }

    #[tokio::test]
    async fn test_load_all_skips_unregistered_products() {
        let temp = tempdir().unwrap();
        let mut ctx = context(
            temp.path(),
            vec![
                Product::new("gtest", "1.8"),
                Product::new("libfoo", "0.1"),
                Product::new("zeromq", "4.0.4"),
            ],
        );

        assert_eq!(ctx.load_all().await.unwrap(), 2);
        assert_eq!(ctx.installed().keys().collect::<Vec<_>>(), vec!["gtest", "zeromq"]);
        assert_eq!(ctx.load_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_from_project_matches_local_sources() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("app");
        let deps = temp.path().join("deps");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("dependency.json"),
            r#"{"product": "app", "version": "1.0", "dependencies": [{"product": "glog", "version": "0.3.3"}]}"#,
        )
        .unwrap();

        let checkout = deps.join("vendor/glog");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("dependency.json"), r#"{"product": "glog", "version": "0.3.3"}"#).unwrap();
        std::fs::write(checkout.join("wscript"), "").unwrap();

        let mut ctx = PrepareContext::from_project(&project, options(&deps)).unwrap();
        assert_eq!(
            ctx.directory().find("glog").unwrap().source_dir(),
            Some(checkout.as_path())
        );

        ctx.load("glog").await.unwrap();
        assert_eq!(ctx.installed()["glog"].include, checkout.join("include"));
        assert_eq!(runs(checkout), 1);
    }
}

//! Fetch-and-build of a single dependency.
//!
//! A dependency is bootstrapped in its *product path*: the directory holding its
//! manifest when local inventory matching found one, otherwise
//! `<dep_base_dir>/<name>-<version>`. Bootstrapping runs three steps:
//!
//! 1. **Source**: unless the product path already contains the entry file
//!    (`wscript` by default), the path is wiped and the tool's bootstrap archive is
//!    downloaded and extracted into it.
//! 2. **Build**: unless `build.status` already reads `success`, the marker is reset
//!    to `failure`, the build command runs inside the product path, and the marker
//!    is set to `success` once it exits cleanly.
//! 3. **Install trees**: `include` and `lib` (plus `bin` for tools that install
//!    binaries) must exist under the product path.
//!
//! ```rust,no_run
//! use depstrap::bootstrap::{Bootstrap, BootstrapOptions};
//! use depstrap::manifest::Product;
//! use depstrap::tools;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = BootstrapOptions::new("/opt/deps");
//! let product = Product::new("gtest", "1.8");
//! let strap = Bootstrap::new(tools::lookup("gtest")?, &product, &options);
//!
//! let installed = strap.run(&options).await?;
//! println!("gtest headers in {}", installed.include.display());
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    DEFAULT_BOOTSTRAP_URL_BASE, DEFAULT_BUILD_ARGS, DEFAULT_BUILD_PROGRAM, DEFAULT_ENTRY_FILE,
    DEFAULT_MAX_DOWNLOAD_ATTEMPTS,
};
use crate::core::DepstrapError;
use crate::fetch;
use crate::layout::OutputTree;
use crate::manifest::Product;
use crate::status::BuildStatus;
use crate::tools::{InstalledPaths, ToolSpec};
use crate::utils::recreate_dir;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Settings shared by every bootstrap in one prepare run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Parent directory of product paths for dependencies not found locally.
    pub dep_base_dir: PathBuf,
    /// Base URL hosting the bootstrap repositories.
    pub bootstrap_url_base: String,
    pub max_attempts: usize,
    /// Program followed by its arguments.
    pub build_command: Vec<String>,
    /// File whose presence marks a product path as already extracted.
    pub entry_file: String,
}

impl BootstrapOptions {
    /// Defaults for everything except the dependency base directory.
    pub fn new(dep_base_dir: impl Into<PathBuf>) -> Self {
        let mut build_command = vec![DEFAULT_BUILD_PROGRAM.to_string()];
        build_command.extend(DEFAULT_BUILD_ARGS.iter().map(|a| (*a).to_string()));
        Self {
            dep_base_dir: dep_base_dir.into(),
            bootstrap_url_base: DEFAULT_BOOTSTRAP_URL_BASE.to_string(),
            max_attempts: DEFAULT_MAX_DOWNLOAD_ATTEMPTS,
            build_command,
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
        }
    }
}

/// Where a product is (or will be) bootstrapped.
pub fn product_path(product: &Product, dep_base_dir: &Path) -> PathBuf {
    match product.source_dir() {
        Some(dir) => dir.to_path_buf(),
        None => dep_base_dir.join(format!("{}-{}", product.name, product.version)),
    }
}

/// Find the build program: a copy shipped in `dir` first, then `PATH`.
fn resolve_program(program: &str, dir: &Path) -> Result<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return Ok(if candidate.is_absolute() { candidate.to_path_buf() } else { dir.join(candidate) });
    }

    let local = dir.join(program);
    if local.is_file() {
        return Ok(local);
    }

    which::which(program).map_err(|e| {
        DepstrapError::ConfigError {
            message: format!("Build program '{program}' not found in {} or on PATH: {e}", dir.display()),
        }
        .into()
    })
}

/// One dependency's bootstrap: its tool, product path and archive URL.
#[derive(Debug, Clone)]
pub struct Bootstrap<'a> {
    tool: &'static ToolSpec,
    product: &'a Product,
    path: PathBuf,
    url: String,
}

impl<'a> Bootstrap<'a> {
    pub fn new(tool: &'static ToolSpec, product: &'a Product, options: &BootstrapOptions) -> Self {
        Self {
            tool,
            product,
            path: product_path(product, &options.dep_base_dir),
            url: tool.bootstrap_url(&options.bootstrap_url_base, &product.version),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make sure the product path holds the bootstrap project.
    ///
    /// Returns `true` when the archive had to be fetched.
    pub async fn ensure_source(&self, options: &BootstrapOptions) -> Result<bool> {
        let entry = self.path.join(&options.entry_file);
        if entry.is_file() {
            debug!(product = %self.product, path = %self.path.display(), "Bootstrap project already present");
            return Ok(false);
        }

        recreate_dir(&self.path)?;
        info!(product = %self.product, url = %self.url, "Downloading and extracting");
        fetch::extract_remote_zip(&self.url, &self.path, options.max_attempts).await?;
        fetch::flatten_single_root(&self.path)?;

        if !entry.is_file() {
            warn!(
                product = %self.product,
                entry = %entry.display(),
                "Extracted bootstrap project has no entry file"
            );
        }
        Ok(true)
    }

    /// Build the dependency unless a previous build already succeeded.
    ///
    /// Returns `true` when the build command ran.
    ///
    /// # Errors
    ///
    /// [`DepstrapError::BuildFailed`] on a non-zero exit, [`DepstrapError::ConfigError`]
    /// for an empty or unresolvable build command.
    pub async fn build(&self, options: &BootstrapOptions) -> Result<bool> {
        if let Ok(previous) = BuildStatus::load(&self.path)
            && previous.is_success()?
        {
            info!(product = %self.product, "Already built, skipping");
            return Ok(false);
        }

        let Some((program, args)) = options.build_command.split_first() else {
            return Err(DepstrapError::ConfigError {
                message: "build_command must name a program".to_string(),
            }
            .into());
        };
        let program = resolve_program(program, &self.path)?;

        let status = BuildStatus::init(&self.path)?;
        info!(
            target: "build",
            product = %self.product,
            path = %self.path.display(),
            "Preparing {} dependency",
            self.tool.title
        );
        debug!(target: "build", "Executing command: {} {}", program.display(), args.join(" "));

        let exit = Command::new(&program)
            .args(args)
            .current_dir(&self.path)
            .status()
            .await
            .with_context(|| format!("Failed to run {}", program.display()))?;

        if !exit.success() {
            let code = exit.code().unwrap_or(-1);
            warn!(target: "build", product = %self.product, code, "Build failed");
            return Err(DepstrapError::BuildFailed {
                name: self.tool.title.to_string(),
                code,
            }
            .into());
        }

        status.set_success()?;
        Ok(true)
    }

    /// The install trees under the product path.
    ///
    /// # Errors
    ///
    /// [`DepstrapError::IncompleteInstall`] naming every directory that is missing.
    pub fn installed_paths(&self) -> Result<InstalledPaths> {
        let paths = InstalledPaths::for_tool(self.tool, &OutputTree::from_root(&self.path));

        let missing: Vec<String> = paths
            .bin
            .iter()
            .chain([&paths.include, &paths.lib])
            .filter(|dir| !dir.is_dir())
            .map(|dir| dir.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DepstrapError::IncompleteInstall {
                name: self.tool.title.to_string(),
                missing: missing.join(", "),
            }
            .into());
        }
        Ok(paths)
    }

    /// Source, build and locate the install trees.
    pub async fn run(&self, options: &BootstrapOptions) -> Result<InstalledPaths> {
        self.ensure_source(options).await?;
        self.build(options).await?;
        let paths = self.installed_paths()?;
        info!(product = %self.product, include = %paths.include.display(), lib = %paths.lib.display(), "Dependency ready");
        Ok(paths)
    }
}

//! Configuration for depstrap
//!
//! Settings come from a TOML file and can be overridden per invocation by CLI flags.
//!
//! # Location
//!
//! The first of these that applies is used:
//!
//! 1. An explicit path (`--config`)
//! 2. The `DEPSTRAP_CONFIG_PATH` environment variable
//! 3. `~/.depstrap/config.toml` (`%LOCALAPPDATA%\depstrap\config.toml` on Windows)
//!
//! A missing file at the default location is not an error; defaults apply.
//!
//! # File Format
//!
//! ```toml
//! # Parent of dependency product paths; defaults to the project directory
//! dep_base_dir = "~/deps"
//! max_download_attempts = 5
//! bootstrap_url_base = "https://github.com/khklau"
//! build_command = ["waf", "prepare", "configure", "build"]
//! entry_file = "wscript"
//! ```
//!
//! Paths are expanded with `~` and `$VAR` substitution.

use crate::bootstrap::BootstrapOptions;
use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_BOOTSTRAP_URL_BASE, DEFAULT_BUILD_ARGS, DEFAULT_BUILD_PROGRAM,
    DEFAULT_ENTRY_FILE, DEFAULT_MAX_DOWNLOAD_ATTEMPTS,
};
use crate::core::DepstrapError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

fn default_build_command() -> Vec<String> {
    std::iter::once(DEFAULT_BUILD_PROGRAM)
        .chain(DEFAULT_BUILD_ARGS)
        .map(str::to_string)
        .collect()
}

/// User configuration.
///
/// # Examples
///
/// ```rust
/// use depstrap::config::DepstrapConfig;
/// use std::path::Path;
///
/// let config: DepstrapConfig = toml::from_str("max_download_attempts = 3").unwrap();
/// let options = config.to_bootstrap_options(Path::new("/work/app")).unwrap();
///
/// assert_eq!(options.max_attempts, 3);
/// assert_eq!(options.dep_base_dir, Path::new("/work/app"));
/// assert_eq!(options.build_command[0], "waf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepstrapConfig {
    /// Parent of product paths for dependencies not found locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_base_dir: Option<String>,

    pub max_download_attempts: usize,

    pub bootstrap_url_base: String,

    /// Program and arguments run inside a product path to build it.
    pub build_command: Vec<String>,

    /// File marking a product path as already extracted.
    pub entry_file: String,
}

impl Default for DepstrapConfig {
    fn default() -> Self {
        Self {
            dep_base_dir: None,
            max_download_attempts: DEFAULT_MAX_DOWNLOAD_ATTEMPTS,
            bootstrap_url_base: DEFAULT_BOOTSTRAP_URL_BASE.to_string(),
            build_command: default_build_command(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
        }
    }
}

impl DepstrapConfig {
    /// Load from the first applicable location.
    ///
    /// # Errors
    ///
    /// An explicitly named file (argument or environment variable) that does not
    /// exist, or any file that cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DepstrapError::ConfigError {
                        message: format!("Config file not found: {}", path.display()),
                    }
                    .into());
                }
                Self::load_from(&path).await
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// `~/.depstrap/config.toml`, or `%LOCALAPPDATA%\depstrap\config.toml` on Windows.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("depstrap")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".depstrap")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Bootstrap settings for a project, resolving `dep_base_dir` against it.
    ///
    /// # Errors
    ///
    /// [`DepstrapError::ConfigError`] for an empty build command, zero download
    /// attempts or a base directory that cannot be expanded.
    pub fn to_bootstrap_options(&self, project_dir: &Path) -> Result<BootstrapOptions> {
        if self.build_command.is_empty() {
            return Err(config_error("build_command must name a program"));
        }
        if self.max_download_attempts == 0 {
            return Err(config_error("max_download_attempts must be at least 1"));
        }

        let dep_base_dir = match &self.dep_base_dir {
            Some(dir) => project_dir.join(expand_path(dir)?),
            None => project_dir.to_path_buf(),
        };

        Ok(BootstrapOptions {
            dep_base_dir,
            bootstrap_url_base: self.bootstrap_url_base.clone(),
            max_attempts: self.max_download_attempts,
            build_command: self.build_command.clone(),
            entry_file: self.entry_file.clone(),
        })
    }
}

fn config_error(message: &str) -> anyhow::Error {
    DepstrapError::ConfigError {
        message: message.to_string(),
    }
    .into()
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    shellexpand::full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| config_error(&format!("Cannot expand '{path}': {e}")))
}

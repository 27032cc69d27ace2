//! Build-status marker files.
//!
//! Every bootstrapped dependency carries a `build.status` file in its product
//! directory holding a single line, `success` or `failure`. The marker is written
//! as `failure` before a build starts and flipped to `success` only after the build
//! exits cleanly, so an interrupted build is never mistaken for a finished one.
//!
//! Several build processes may share a dependency directory. Writers hold an
//! exclusive OS lock on the marker and readers a shared one, so a reader never
//! observes a torn value.
//!
//! ```rust,no_run
//! use depstrap::status::BuildStatus;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let dir = Path::new("deps/gtest-1.8");
//! let status = BuildStatus::init(dir)?;
//! // ... run the build ...
//! status.set_success()?;
//!
//! assert!(BuildStatus::load(dir)?.is_success()?);
//! # Ok(())
//! # }
//! ```

use crate::constants::{STATUS_FAILURE, STATUS_FILE_NAME, STATUS_SUCCESS};
use crate::core::DepstrapError;
use crate::utils::ensure_dir;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Value recorded in a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Success,
    Failure,
    /// Empty or unrecognised content.
    Unknown,
}

impl BuildState {
    /// Interpret marker content. Surrounding whitespace and case are ignored.
    pub fn parse(content: &str) -> Self {
        let value = content.lines().next().unwrap_or_default().trim();
        if value.eq_ignore_ascii_case(STATUS_SUCCESS) {
            Self::Success
        } else if value.eq_ignore_ascii_case(STATUS_FAILURE) {
            Self::Failure
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str(STATUS_SUCCESS),
            Self::Failure => f.write_str(STATUS_FAILURE),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Handle on the `build.status` marker of one product directory.
#[derive(Debug, Clone)]
pub struct BuildStatus {
    path: PathBuf,
}

impl BuildStatus {
    /// Create or truncate the marker in `dir` and record `failure`, creating `dir`
    /// if needed.
    ///
    /// # Errors
    ///
    /// Fails if the marker cannot be created or locked.
    pub fn init(dir: &Path) -> Result<Self> {
        ensure_dir(dir)?;
        let status = Self {
            path: dir.join(STATUS_FILE_NAME),
        };
        status.write(BuildState::Failure)?;
        Ok(status)
    }

    /// Open an existing marker in `dir`.
    ///
    /// # Errors
    ///
    /// [`DepstrapError::BuildStatusUnavailable`] if the marker is missing or cannot
    /// be opened for reading.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(STATUS_FILE_NAME);
        if !path.is_file() {
            return Err(DepstrapError::BuildStatusUnavailable {
                path: path.display().to_string(),
                reason: "does not exist".to_string(),
            }
            .into());
        }
        File::open(&path).map_err(|e| DepstrapError::BuildStatusUnavailable {
            path: path.display().to_string(),
            reason: format!("is not readable: {e}"),
        })?;

        Ok(Self {
            path,
        })
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_success(&self) -> Result<()> {
        self.write(BuildState::Success)
    }

    pub fn set_failure(&self) -> Result<()> {
        self.write(BuildState::Failure)
    }

    pub fn is_success(&self) -> Result<bool> {
        Ok(self.read()? == BuildState::Success)
    }

    pub fn is_failure(&self) -> Result<bool> {
        Ok(self.read()? == BuildState::Failure)
    }

    /// Read the recorded state under a shared lock.
    pub fn read(&self) -> Result<BuildState> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open build status: {}", self.path.display()))?;
        FileExt::lock_shared(&file)
            .with_context(|| format!("Failed to lock build status: {}", self.path.display()))?;

        let mut content = String::new();
        let result = file.read_to_string(&mut content);
        FileExt::unlock(&file)?;
        result.with_context(|| format!("Failed to read build status: {}", self.path.display()))?;

        let state = BuildState::parse(&content);
        debug!(path = %self.path.display(), %state, "Read build status");
        Ok(state)
    }

    fn write(&self, state: BuildState) -> Result<()> {
        // Truncate only once the lock is held so readers never see an empty marker
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("Failed to open build status: {}", self.path.display()))?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("Failed to lock build status: {}", self.path.display()))?;

        let result = (|| -> std::io::Result<()> {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            writeln!(file, "{state}")?;
            file.sync_all()
        })();
        FileExt::unlock(&file)?;
        result.with_context(|| format!("Failed to write build status: {}", self.path.display()))?;

        debug!(path = %self.path.display(), %state, "Wrote build status");
        Ok(())
    }
}

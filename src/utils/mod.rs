//! Filesystem helpers shared by the fetch, status and bootstrap modules.
//!
//! # Example
//!
//! ```rust,no_run
//! use depstrap::utils::{ensure_dir, recreate_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("deps/downloads"))?;
//! recreate_dir(Path::new("deps/gtest-1.8"))?;
//! # Ok(())
//! # }
//! ```

pub mod fs;

pub use fs::{ensure_dir, ensure_parent_dir, recreate_dir, remove_path};

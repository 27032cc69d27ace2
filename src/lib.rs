//! depstrap - native dependency bootstrapper
//!
//! A library and CLI that teaches a build tool how to locate, fetch, bootstrap and
//! validate third-party native dependencies (test frameworks, serialization
//! compilers, messaging libraries) before a compiled project is configured.
//!
//! # Architecture Overview
//!
//! The heart of the crate is the dependency resolver. A project declares its direct
//! dependencies in a `dependency.json` manifest; each dependency may declare its own
//! nested dependencies. Resolution flattens that tree into a [`resolver::ProductDirectory`]
//! that every per-dependency bootstrap step consults by name.
//!
//! ```text
//! dependency.json ──► manifest::parse_file ──► Product tree
//!                                                   │
//!                                   resolver::resolve (breadth-first)
//!                                                   │
//!                                                   ▼
//!                       ProductDirectory ◄── inventory::LocalInventory (on-disk matches)
//!                                                   │
//!                                   prepare::PrepareContext::load(tool)
//!                                                   │
//!                                 bootstrap ─► fetch ─► build ─► tools::check
//! ```
//!
//! # Core Modules
//!
//! - [`manifest`] - `dependency.json` parsing into [`manifest::Product`] trees
//! - [`resolver`] - transitive resolution, conflict and cycle detection, local matching
//! - [`core`] - error types and user-facing error reporting
//!
//! # Collaborators
//!
//! - [`fetch`] - downloads with bounded retries, SHA-256 verification, archive extraction
//! - [`status`] - `build.status` markers guarded by OS file locks
//! - [`layout`] - source, build and install tree path builders
//! - [`tools`] - registry of known dependencies and installation checks
//! - [`bootstrap`] - fetch-and-build of a single dependency
//! - [`prepare`] - the prepare phase tying everything together
//!
//! # Supporting Modules
//!
//! - [`config`] - `~/.depstrap/config.toml` loading and bootstrap defaults
//! - [`cli`] - the `depstrap` command line
//! - [`utils`] - filesystem helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use depstrap::{manifest, resolver};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let root = manifest::parse_file(Path::new("dependency.json"))?;
//! let mut directory = resolver::resolve(&root)?;
//! resolver::match_local(Path::new("/opt/deps"), &mut directory);
//!
//! if directory.contains("gtest") {
//!     let gtest = directory.find("gtest")?;
//!     println!("gtest {} at {:?}", gtest.version, gtest.source_location);
//! }
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod manifest;
pub mod resolver;

// Collaborators
pub mod bootstrap;
pub mod fetch;
pub mod layout;
pub mod prepare;
pub mod status;
pub mod tools;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

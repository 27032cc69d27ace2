//! Integration test suite for depstrap
//!
//! End-to-end tests driving the `depstrap` binary and the public library API against
//! temporary projects, dependency directories and `file://` bootstrap mirrors. No
//! network access is needed.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **check**: `depstrap check` against install prefixes
//! - **fetch**: downloads, checksum pinning and extraction
//! - **inventory**: matching resolved products against checkouts on disk
//! - **prepare**: the full prepare phase through a local mirror
//! - **resolve**: manifest resolution, conflicts and cycles
//! - **status**: build status markers

#[path = "../common/mod.rs"]
mod common;

mod check;
mod fetch;
mod inventory;
mod prepare;
mod resolve;
mod status;

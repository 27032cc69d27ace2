//! Dependency resolution for depstrap.
//!
//! Resolution collapses a [`Product`] tree, which may mention the same dependency
//! at several points, into one flat [`ProductDirectory`] keyed by name.
//!
//! # Algorithm
//!
//! A breadth-first worklist seeded with the root's direct dependencies:
//!
//! 1. Take the next candidate.
//! 2. If the directory already holds a product with that name:
//!    - different version: fail with [`DepstrapError::VersionConflict`], reporting
//!      the version discovered first as `existing`;
//!    - same version: fail with [`DepstrapError::CyclicDependency`].
//! 3. Otherwise record the candidate.
//! 4. Append the candidate's own dependencies to the end of the worklist.
//!
//! Every dependency edge is visited exactly once, so a run costs O(edges).
//!
//! # Diamonds
//!
//! Re-visiting an already resolved name at the same version is always an error,
//! which means a diamond (two parents sharing a child at the same version) is
//! rejected exactly like a true cycle:
//!
//! ```rust
//! use depstrap::core::DepstrapError;
//! use depstrap::manifest::Product;
//! use depstrap::resolver::resolve;
//!
//! let shared = || Product::new("B", "2.0");
//! let root = Product::new("root", "1.0").with_dependencies(vec![
//!     Product::new("A", "1.0").with_dependencies(vec![shared()]),
//!     Product::new("C", "1.0").with_dependencies(vec![shared()]),
//! ]);
//!
//! let err = resolve(&root).unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<DepstrapError>(),
//!     Some(DepstrapError::CyclicDependency { name }) if name == "B"
//! ));
//! ```
//!
//! Manifests that legitimately share a transitive dependency must therefore list
//! it once, at the shallowest level that needs it.
//!
//! # Local inventory
//!
//! After resolution, [`match_local`] cross-references the directory with
//! manifests already present under a base directory, so bootstrap steps can reuse
//! an existing checkout instead of fetching again. See [`inventory`].

pub mod directory;
pub mod inventory;


pub use directory::ProductDirectory;
pub use inventory::LocalInventory;

use crate::core::DepstrapError;
use crate::manifest::Product;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

/// Resolve a product tree into a flat directory.
///
/// Resolution is all-or-nothing: the first conflict or repeated visit aborts the
/// run and no partial directory is returned.
///
/// # Errors
///
/// - [`DepstrapError::VersionConflict`] when a name appears with two versions
/// - [`DepstrapError::CyclicDependency`] when a name/version pair is reached twice
///
/// # Examples
///
/// ```rust
/// use depstrap::manifest::Product;
/// use depstrap::resolver::resolve;
///
/// let root = Product::new("app", "1.0").with_dependencies(vec![
///     Product::new("gmock", "1.7").with_dependencies(vec![Product::new("gtest", "1.7")]),
///     Product::new("protobuf", "2.6"),
/// ]);
///
/// let directory = resolve(&root).unwrap();
/// assert_eq!(directory.names(), vec!["gmock", "protobuf", "gtest"]);
/// ```
pub fn resolve(root: &Product) -> Result<ProductDirectory> {
    let mut directory = ProductDirectory::new(root.clone());

    // Borrowed nodes of the tree; `cursor` is the next one to visit. Newly
    // discovered dependencies are appended, giving breadth-first order.
    let mut worklist: Vec<&Product> = root.dependencies.iter().collect();
    let mut cursor = 0;

    while let Some(&candidate) = worklist.get(cursor) {
        cursor += 1;

        if let Some(existing) = directory.get(&candidate.name) {
            if existing.version != candidate.version {
                warn!(
                    product = %candidate.name,
                    existing = %existing.version,
                    conflicting = %candidate.version,
                    "Version mismatch"
                );
                return Err(DepstrapError::VersionConflict {
                    name: candidate.name.clone(),
                    existing: existing.version.clone(),
                    conflicting: candidate.version.clone(),
                }
                .into());
            }

            warn!(product = %candidate, "Product reached twice");
            return Err(DepstrapError::CyclicDependency {
                name: candidate.name.clone(),
            }
            .into());
        }

        debug!(product = %candidate, children = candidate.dependencies.len(), "Resolved product");
        directory.add(candidate.clone());
        worklist.extend(candidate.dependencies.iter());
    }

    info!(root = %root, products = directory.len(), edges = cursor, "Dependency directory resolved");
    Ok(directory)
}

/// Record on-disk manifest locations for resolved products found under `base_dir`.
///
/// Returns the number of directory entries that were matched. A missing base
/// directory or zero matches is not an error.
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::manifest::Product;
/// use depstrap::resolver::{match_local, resolve};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = Product::new("app", "1.0").with_dependencies(vec![Product::new("gtest", "1.8")]);
/// let mut directory = resolve(&root)?;
/// let matched = match_local(Path::new("/opt/deps"), &mut directory);
/// println!("{matched} dependencies already on disk");
/// # Ok(())
/// # }
/// ```
pub fn match_local(base_dir: &Path, directory: &mut ProductDirectory) -> usize {
    LocalInventory::scan(base_dir).match_directory(directory)
}

//! Dependency manifest (`dependency.json`) model and parsing.
//!
//! A manifest names a product, its version, and the products it depends on. Each
//! dependency entry has the same shape as the document itself, so a manifest is a
//! tree:
//!
//! ```json
//! {
//!     "product": "myapp",
//!     "version": "1.0",
//!     "dependencies": [
//!         { "product": "gmock", "version": "1.7",
//!           "dependencies": [ { "product": "gtest", "version": "1.7" } ] },
//!         { "product": "protobuf", "version": "2.6" }
//!     ]
//! }
//! ```
//!
//! Parsing goes through an explicit record type and is validated immediately: a
//! missing or empty `product` / `version` is reported as
//! [`DepstrapError::MalformedManifest`](crate::core::DepstrapError::MalformedManifest)
//! at parse time rather than surfacing later as a missing-field lookup.
//!
//! Only the top-level product of a document is tagged with the file it was read
//! from. Products embedded in its `dependencies` list have no source location until
//! local inventory matching finds a manifest of their own on disk.

mod manifest_io;


pub use manifest_io::{find_manifest, parse_file, parse_str, to_json};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One named, versioned dependency node.
///
/// Versions are opaque strings compared exactly; `"1.8"` and `"1.8.0"` are
/// different versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Product identifier, unique within a resolved directory.
    pub name: String,
    /// Exact version string.
    pub version: String,
    /// Manifest this product was found in on disk, if it has been located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_location: Option<PathBuf>,
    /// Child products, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Product>,
}

impl Product {
    /// Create a product with no dependencies and no source location.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_location: None,
            dependencies: Vec::new(),
        }
    }

    /// Builder-style setter for the dependency list.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Product>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Builder-style setter for the source location.
    #[must_use]
    pub fn with_source_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_location = Some(path.into());
        self
    }

    /// Directory holding this product's manifest, when it has been located.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_location.as_deref().and_then(Path::parent)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

//! Reading and writing `dependency.json` documents.

use crate::constants::MANIFEST_FILE_NAME;
use crate::core::DepstrapError;
use crate::manifest::Product;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk shape of a manifest entry. Unknown fields are ignored.
#[derive(Debug, Deserialize, Serialize)]
struct ManifestRecord {
    product: String,
    version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<ManifestRecord>,
}

impl ManifestRecord {
    /// Validate this record and its children, producing an untagged product tree.
    ///
    /// `at` names the record's position in the document for error messages.
    fn into_product(self, at: &str) -> std::result::Result<Product, String> {
        if self.product.trim().is_empty() {
            return Err(format!("{at}: \"product\" must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(format!("{at}: \"version\" of '{}' must not be empty", self.product));
        }

        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (i, child) in self.dependencies.into_iter().enumerate() {
            dependencies.push(child.into_product(&format!("{at}.dependencies[{i}]"))?);
        }

        Ok(Product {
            name: self.product,
            version: self.version,
            source_location: None,
            dependencies,
        })
    }

    fn from_product(product: &Product) -> Self {
        Self {
            product: product.name.clone(),
            version: product.version.clone(),
            dependencies: product.dependencies.iter().map(Self::from_product).collect(),
        }
    }
}

/// Parse a manifest document held in memory.
///
/// The returned top-level product is tagged with `origin`; nested products are
/// embedded in this document and carry no source location.
///
/// # Errors
///
/// [`DepstrapError::MalformedManifest`] when the content is not valid JSON, a
/// required field is missing or has the wrong type, or a name or version is empty.
///
/// # Examples
///
/// ```rust
/// use depstrap::manifest::parse_str;
///
/// let root = parse_str(
///     r#"{"product": "app", "version": "1.0",
///         "dependencies": [{"product": "gtest", "version": "1.8"}]}"#,
///     None,
/// )
/// .unwrap();
/// assert_eq!(root.dependencies[0].name, "gtest");
/// ```
pub fn parse_str(content: &str, origin: Option<&Path>) -> Result<Product> {
    let file = origin.map_or_else(|| "<inline>".to_string(), |p| p.display().to_string());

    let record: ManifestRecord =
        serde_json::from_str(content).map_err(|e| DepstrapError::MalformedManifest {
            file: file.clone(),
            reason: e.to_string(),
        })?;

    let mut product = record.into_product("$").map_err(|reason| DepstrapError::MalformedManifest {
        file,
        reason,
    })?;
    product.source_location = origin.map(Path::to_path_buf);

    Ok(product)
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// - [`DepstrapError::ManifestNotFound`] if the path does not exist or cannot be read
/// - [`DepstrapError::MalformedManifest`] if the content is not a valid manifest
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::manifest::parse_file;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = parse_file(Path::new("dependency.json"))?;
/// println!("{} declares {} direct dependencies", root, root.dependencies.len());
/// # Ok(())
/// # }
/// ```
pub fn parse_file(path: &Path) -> Result<Product> {
    debug!(path = %path.display(), "Parsing manifest");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            DepstrapError::MalformedManifest {
                file: path.display().to_string(),
                reason: "content is not valid UTF-8".to_string(),
            }
        } else {
            debug!(path = %path.display(), error = %e, "Manifest unreadable");
            DepstrapError::ManifestNotFound {
                path: path.display().to_string(),
            }
        }
    })?;

    parse_str(&content, Some(path))
}

/// Locate the conventional `dependency.json` in a project directory.
///
/// # Errors
///
/// [`DepstrapError::ManifestNotFound`] when the directory has no manifest file.
pub fn find_manifest(project_dir: &Path) -> Result<PathBuf> {
    let path = project_dir.join(MANIFEST_FILE_NAME);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DepstrapError::ManifestNotFound {
            path: path.display().to_string(),
        }
        .into())
    }
}

/// Serialize a product tree back into manifest form (pretty-printed JSON).
///
/// Source locations are not part of the manifest format and are dropped.
pub fn to_json(product: &Product) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ManifestRecord::from_product(product))?)
}

//! Discovery of dependency checkouts already present on disk.
//!
//! A base directory (typically the dependency cache) is walked recursively for
//! files named `dependency.json`. Each one is parsed into a candidate, tagged with
//! its own path, and indexed by `(name, version)`. Resolved directory entries with
//! an exact name and version match then have their source location set to the
//! candidate's manifest.
//!
//! Discovery is best-effort. Unreadable directories and manifests that fail to
//! parse are logged and skipped, and a version mismatch between a resolved entry
//! and a discovered manifest simply leaves the entry unmatched.

use crate::constants::MANIFEST_FILE_NAME;
use crate::manifest::{self, Product};
use crate::resolver::ProductDirectory;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Manifests found under a base directory, keyed by `(name, version)`.
#[derive(Debug, Default)]
pub struct LocalInventory {
    base_dir: PathBuf,
    candidates: HashMap<(String, String), Product>,
}

impl LocalInventory {
    /// Walk `base_dir` and collect every parseable manifest.
    ///
    /// Symbolic links are followed and siblings are visited in file-name order,
    /// so when two manifests declare the same name and version the one found first
    /// in that order wins. A missing base directory yields an empty inventory.
    pub fn scan(base_dir: &Path) -> Self {
        let mut inventory = Self {
            base_dir: base_dir.to_path_buf(),
            candidates: HashMap::new(),
        };

        if !base_dir.exists() {
            debug!(base_dir = %base_dir.display(), "No local dependency directory to scan");
            return inventory;
        }

        for entry in WalkDir::new(base_dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(base_dir = %base_dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE_NAME {
                continue;
            }

            match manifest::parse_file(entry.path()) {
                Ok(candidate) => inventory.insert(candidate),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unparseable manifest");
                }
            }
        }

        info!(
            base_dir = %base_dir.display(),
            manifests = inventory.len(),
            "Scanned local dependencies"
        );
        inventory
    }

    /// Add a candidate unless one with the same name and version is already known.
    fn insert(&mut self, candidate: Product) {
        let key = (candidate.name.clone(), candidate.version.clone());
        if let Some(existing) = self.candidates.get(&key) {
            debug!(
                product = %candidate,
                kept = ?existing.source_location,
                ignored = ?candidate.source_location,
                "Duplicate local manifest"
            );
            return;
        }
        self.candidates.insert(key, candidate);
    }

    /// Directory that was scanned.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of distinct `(name, version)` manifests found.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True when no manifests were found.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Manifest path for an exact name and version, if one was found.
    pub fn locate(&self, name: &str, version: &str) -> Option<&Path> {
        self.candidates
            .get(&(name.to_string(), version.to_string()))
            .and_then(|c| c.source_location.as_deref())
    }

    /// Set the source location of every directory entry with an exact match.
    ///
    /// Entries without a match keep whatever source location they already had.
    /// Returns the number of entries matched.
    pub fn match_directory(&self, directory: &mut ProductDirectory) -> usize {
        let mut matched = 0;

        for product in directory.iter_mut() {
            match self.locate(&product.name, &product.version) {
                Some(path) => {
                    debug!(product = %product, path = %path.display(), "Matched local manifest");
                    product.source_location = Some(path.to_path_buf());
                    matched += 1;
                }
                None => debug!(product = %product, "No local manifest"),
            }
        }

        info!(matched, total = directory.len(), "Matched resolved products to local checkouts");
        matched
    }
}

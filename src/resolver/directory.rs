//! The flat, resolved view of a dependency tree.

use crate::core::DepstrapError;
use crate::manifest::Product;
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};

/// Mapping from product name to its resolved [`Product`], plus the root manifest.
///
/// Entries live in an arena in breadth-first discovery order, with a name index on
/// top, so iteration is deterministic and lookups are O(1). The root is not stored
/// under its own name.
///
/// Only the resolver and local inventory matching mutate a directory; downstream
/// consumers get a read-only view and follow the `contains` then `find` contract:
///
/// ```rust
/// use depstrap::manifest::Product;
/// use depstrap::resolver::resolve;
///
/// let root = Product::new("app", "1.0").with_dependencies(vec![Product::new("gtest", "1.8")]);
/// let directory = resolve(&root).unwrap();
///
/// if directory.contains("gtest") {
///     assert_eq!(directory.find("gtest").unwrap().version, "1.8");
/// }
/// assert!(directory.find("zeromq").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ProductDirectory {
    root: Product,
    entries: Vec<Product>,
    index: HashMap<String, usize>,
}

impl ProductDirectory {
    pub(crate) fn new(root: Product) -> Self {
        Self {
            root,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The manifest resolution started from.
    pub fn root(&self) -> &Product {
        &self.root
    }

    /// Insert a product, replacing any entry with the same name.
    pub(crate) fn add(&mut self, product: Product) {
        match self.index.get(&product.name) {
            Some(&slot) => self.entries[slot] = product,
            None => {
                self.index.insert(product.name.clone(), self.entries.len());
                self.entries.push(product);
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Product> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        self.entries.iter_mut()
    }

    /// Whether a product with this name was resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a resolved product by name.
    ///
    /// # Errors
    ///
    /// [`DepstrapError::ProductNotFound`] when no product with that name was resolved.
    pub fn find(&self, name: &str) -> Result<&Product> {
        self.get(name).ok_or_else(|| {
            DepstrapError::ProductNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Number of resolved products (the root is not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the root declared no dependencies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved products in breadth-first discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.entries.iter()
    }

    /// Resolved product names in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|p| p.name.as_str()).collect()
    }

    /// Name → version view of the directory, sorted by name.
    pub fn versions(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|p| (p.name.clone(), p.version.clone())).collect()
    }
}

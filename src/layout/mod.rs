//! Source, build and install tree layouts.
//!
//! Layouts nest three levels deep. A [`SolutionLayout`] owns the build and install
//! roots of a whole checkout. Each [`ProductLayout`] inside it namespaces the
//! `include` and `test` trees by product name, and each [`ComponentLayout`] inside a
//! product namespaces them again by component name, while `bin`, `lib` and `doc`
//! stay shared.
//!
//! ```text
//! build_root/
//! ├── bin/
//! ├── lib/
//! ├── doc/
//! ├── include/<product>/<component>/
//! └── test/<product>/<component>/
//! ```
//!
//! # Example
//!
//! ```rust
//! use depstrap::layout::{ComponentLayout, ProductLayout, SolutionLayout};
//! use std::path::Path;
//!
//! let mut solution = SolutionLayout::new("/work/build", "/usr/local");
//! let mut product = ProductLayout::new(&solution, "beam");
//! let component = ComponentLayout::new(Path::new("/work/src/queue"), &product, "queue");
//!
//! assert_eq!(component.build_tree.include, Path::new("/work/build/include/beam/queue"));
//! assert_eq!(component.rpath_list[0], "$ORIGIN/../lib");
//!
//! product.add_component(component);
//! solution.add_product(product);
//! assert!(solution.product("beam").unwrap().component("queue").is_ok());
//! ```

use crate::core::DepstrapError;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Runtime search path entry resolving to the `lib` directory next to a binary.
pub const ORIGIN_RPATH: &str = "$ORIGIN/../lib";

/// Directories of a source checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputTree {
    pub root: PathBuf,
    pub src: PathBuf,
    pub doc: PathBuf,
    pub include: PathBuf,
    pub test: PathBuf,
}

impl InputTree {
    /// Conventional `src`, `doc`, `include` and `test` directories under `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            src: root.join("src"),
            doc: root.join("doc"),
            include: root.join("include"),
            test: root.join("test"),
            root,
        }
    }
}

/// Directories of a build or install tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTree {
    pub root: PathBuf,
    pub bin: PathBuf,
    pub lib: PathBuf,
    pub doc: PathBuf,
    pub include: PathBuf,
    pub test: PathBuf,
}

impl OutputTree {
    /// Conventional `bin`, `lib`, `doc`, `include` and `test` directories under `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            bin: root.join("bin"),
            lib: root.join("lib"),
            doc: root.join("doc"),
            include: root.join("include"),
            test: root.join("test"),
            root,
        }
    }

    /// Same tree with `include` and `test` pushed one level down into `name`.
    pub fn namespaced(&self, name: &str) -> Self {
        Self {
            root: self.root.clone(),
            bin: self.bin.clone(),
            lib: self.lib.clone(),
            doc: self.doc.clone(),
            include: self.include.join(name),
            test: self.test.join(name),
        }
    }
}

/// Layout of a whole checkout and registry of its products.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionLayout {
    pub build_tree: OutputTree,
    pub install_tree: OutputTree,
    pub include_path_list: Vec<PathBuf>,
    pub lib_path_list: Vec<PathBuf>,
    products: BTreeMap<String, ProductLayout>,
}

impl SolutionLayout {
    pub fn new(build_root: impl Into<PathBuf>, install_root: impl Into<PathBuf>) -> Self {
        let build_tree = OutputTree::from_root(build_root);
        let install_tree = OutputTree::from_root(install_root);
        Self {
            include_path_list: vec![build_tree.include.clone()],
            lib_path_list: vec![build_tree.lib.clone()],
            build_tree,
            install_tree,
            products: BTreeMap::new(),
        }
    }

    /// Register a product, replacing any previous one with the same name.
    pub fn add_product(&mut self, product: ProductLayout) {
        self.products.insert(product.name.clone(), product);
    }

    /// # Errors
    ///
    /// [`DepstrapError::ProductNotFound`] when no product with that name was added.
    pub fn product(&self, name: &str) -> Result<&ProductLayout> {
        self.products.get(name).ok_or_else(|| {
            DepstrapError::ProductNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductLayout> {
        self.products.values()
    }
}

/// Layout of one product within a solution.
#[derive(Debug, Clone, Serialize)]
pub struct ProductLayout {
    pub name: String,
    pub build_tree: OutputTree,
    pub install_tree: OutputTree,
    pub include_path_list: Vec<PathBuf>,
    pub lib_path_list: Vec<PathBuf>,
    components: BTreeMap<String, ComponentLayout>,
}

impl ProductLayout {
    pub fn new(solution: &SolutionLayout, name: &str) -> Self {
        Self {
            name: name.to_string(),
            build_tree: solution.build_tree.namespaced(name),
            install_tree: solution.install_tree.namespaced(name),
            include_path_list: solution.include_path_list.clone(),
            lib_path_list: solution.lib_path_list.clone(),
            components: BTreeMap::new(),
        }
    }

    /// Register a component, replacing any previous one with the same name.
    pub fn add_component(&mut self, component: ComponentLayout) {
        self.components.insert(component.name.clone(), component);
    }

    /// # Errors
    ///
    /// [`DepstrapError::ComponentNotFound`] when no component with that name was added.
    pub fn component(&self, name: &str) -> Result<&ComponentLayout> {
        self.components.get(name).ok_or_else(|| {
            DepstrapError::ComponentNotFound {
                product: self.name.clone(),
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentLayout> {
        self.components.values()
    }
}

/// Layout of one component (library or executable) within a product.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentLayout {
    pub name: String,
    pub input_tree: InputTree,
    pub build_tree: OutputTree,
    pub install_tree: OutputTree,
    /// The component's own `include` directory first, then the product's.
    pub include_path_list: Vec<PathBuf>,
    pub lib_path_list: Vec<PathBuf>,
    /// `$ORIGIN/../lib`, the product's library paths, then the install `lib`.
    pub rpath_list: Vec<String>,
}

impl ComponentLayout {
    /// Derive a component layout from its source directory and owning product.
    pub fn new(project_dir: &Path, product: &ProductLayout, name: &str) -> Self {
        let input_tree = InputTree::from_root(project_dir);

        let mut include_path_list = vec![input_tree.include.clone()];
        include_path_list.extend(product.include_path_list.iter().cloned());

        let mut rpath_list = vec![ORIGIN_RPATH.to_string()];
        rpath_list.extend(product.lib_path_list.iter().map(|p| p.display().to_string()));
        rpath_list.push(product.install_tree.lib.display().to_string());

        Self {
            name: name.to_string(),
            build_tree: product.build_tree.namespaced(name),
            install_tree: product.install_tree.namespaced(name),
            include_path_list,
            lib_path_list: product.lib_path_list.clone(),
            rpath_list,
            input_tree,
        }
    }
}

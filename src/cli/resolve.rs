//! Print the resolved dependency directory of a project.
//!
//! ```text
//! app 1.0 (4 dependencies)
//!   gmock 1.7.0
//!   capnproto 0.5.3  /opt/deps/capnproto/dependency.json
//!   gtest 1.7.0
//!   kj 0.5.3
//! ```

use super::{CommandContext, OutputFormat};
use crate::config::expand_path;
use crate::manifest::{self, Product};
use crate::resolver::{self, ProductDirectory};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Directory searched for dependency manifests already on disk
    #[arg(long, value_name = "DIR")]
    pub dep_base_dir: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ResolvedEntry<'a> {
    name: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_location: Option<&'a Path>,
}

impl<'a> From<&'a Product> for ResolvedEntry<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            name: &product.name,
            version: &product.version,
            source_location: product.source_location.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    root: ResolvedEntry<'a>,
    matched: usize,
    products: Vec<ResolvedEntry<'a>>,
}

impl ResolveCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let base_dir = self.base_dir(ctx)?;
        let root = manifest::parse_file(&manifest::find_manifest(&ctx.project_dir)?)?;
        let mut directory = resolver::resolve(&root)?;
        let matched = resolver::match_local(&base_dir, &mut directory);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report(&directory, matched))?);
            }
            OutputFormat::Text => print_text(&directory),
        }
        Ok(())
    }

    fn base_dir(&self, ctx: &CommandContext) -> Result<PathBuf> {
        match &self.dep_base_dir {
            Some(dir) => Ok(ctx.project_dir.join(expand_path(dir)?)),
            None => Ok(ctx.config.to_bootstrap_options(&ctx.project_dir)?.dep_base_dir),
        }
    }
}

fn report(directory: &ProductDirectory, matched: usize) -> ResolveReport<'_> {
    ResolveReport {
        root: directory.root().into(),
        matched,
        products: directory.iter().map(ResolvedEntry::from).collect(),
    }
}

fn print_text(directory: &ProductDirectory) {
    let root = directory.root();
    let count = match directory.len() {
        1 => "1 dependency".to_string(),
        n => format!("{n} dependencies"),
    };
    println!("{} {} ({count})", root.name.bold(), root.version);

    for product in directory.iter() {
        match &product.source_location {
            Some(location) => println!(
                "  {} {}  {}",
                product.name.green(),
                product.version,
                location.display().to_string().dimmed()
            ),
            None => println!("  {} {}", product.name.green(), product.version),
        }
    }
}

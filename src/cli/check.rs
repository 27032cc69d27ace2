//! Verify a tool's installation under an install prefix.

use crate::layout::OutputTree;
use crate::tools::{self, InstalledPaths};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Tool name, e.g. `gtest` or `protobuf`
    pub tool: String,

    /// Install prefix holding `bin`, `include` and `lib`
    #[arg(long, value_name = "DIR")]
    pub prefix: PathBuf,
}

impl CheckCommand {
    pub fn execute(self) -> Result<()> {
        let tool = tools::lookup(&self.tool)?;
        let paths = InstalledPaths::for_tool(tool, &OutputTree::from_root(&self.prefix));
        tool.check_installation(&paths)?;

        println!("{} {} installation at {} is complete", "✓".green(), tool.title, self.prefix.display());
        Ok(())
    }
}

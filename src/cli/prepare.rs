//! Run the prepare phase for a project.

use super::CommandContext;
use crate::config::expand_path;
use crate::prepare::PrepareContext;
use crate::tools::InstalledPaths;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct PrepareCommand {
    /// Tools to load (default: every known tool the project depends on)
    #[arg(value_name = "TOOL")]
    pub tools: Vec<String>,

    /// Parent directory of bootstrapped dependencies
    #[arg(long, value_name = "DIR")]
    pub dep_base_dir: Option<String>,

    /// Download attempts per archive
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_attempts: Option<u64>,
}

impl PrepareCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut options = ctx.config.to_bootstrap_options(&ctx.project_dir)?;
        if let Some(dir) = &self.dep_base_dir {
            options.dep_base_dir = ctx.project_dir.join(expand_path(dir)?);
        }
        if let Some(attempts) = self.max_attempts {
            options.max_attempts = usize::try_from(attempts)?;
        }

        let mut context = PrepareContext::from_project(&ctx.project_dir, options)?;
        if self.tools.is_empty() {
            context.load_all().await?;
        } else {
            for tool in &self.tools {
                context.load(tool).await?;
            }
        }

        if context.installed().is_empty() {
            println!("No dependencies to prepare");
        }
        for (name, paths) in context.installed() {
            print_installed(name, paths);
        }
        Ok(())
    }
}

fn print_installed(name: &str, paths: &InstalledPaths) {
    println!("{} {}", "✓".green(), name.bold());
    if let Some(bin) = &paths.bin {
        println!("    bin:     {}", bin.display());
    }
    println!("    include: {}", paths.include.display());
    println!("    lib:     {}", paths.lib.display());
}

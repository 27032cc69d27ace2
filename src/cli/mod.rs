//! Command-line interface for depstrap.
//!
//! The binary is what a host build tool shells out to during its prepare phase. Each
//! subcommand lives in its own module and implements an `execute` method taking the
//! shared [`CommandContext`].
//!
//! # Commands
//!
//! - `resolve` - parse, resolve and match the project's dependencies and print them
//! - `prepare` - bootstrap every dependency the project needs
//! - `status` - inspect or update a `build.status` marker
//! - `fetch` - mirror a remote file, optionally checksum-pinned and extracted
//! - `check` - verify a tool's installation under a prefix
//!
//! # Global Options
//!
//! - `-v, --verbose` / `-q, --quiet` - log level `debug` / `error` (default `info`)
//! - `-c, --config <PATH>` - configuration file (see [`crate::config`])
//! - `-C, --project-dir <DIR>` - directory holding `dependency.json`
//!
//! ```bash
//! depstrap resolve --format json
//! depstrap -C ../app --verbose prepare --dep-base-dir /opt/deps
//! depstrap status show /opt/deps/gtest-1.8
//! ```

mod check;
mod fetch;
mod prepare;
mod resolve;
mod status;


use crate::config::DepstrapConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Output format shared by commands that print structured data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// State every subcommand runs against.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_dir: PathBuf,
    pub config: DepstrapConfig,
}

/// Native dependency bootstrapper.
#[derive(Parser, Debug)]
#[command(
    name = "depstrap",
    about = "Resolve, fetch and bootstrap native build dependencies",
    version,
    author,
    long_about = "depstrap reads a project's dependency.json, resolves its transitive \
                  dependencies and bootstraps each one before the project is configured."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: ~/.depstrap/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project directory containing dependency.json (default: current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the project's dependencies and print the flattened directory
    Resolve(resolve::ResolveCommand),

    /// Bootstrap the project's dependencies
    Prepare(prepare::PrepareCommand),

    /// Inspect or update a build status marker
    Status(status::StatusCommand),

    /// Download a file with retries, optionally verifying and extracting it
    Fetch(fetch::FetchCommand),

    /// Check a tool's installation under a prefix
    Check(check::CheckCommand),
}

impl Cli {
    /// Log filter directive for the selected verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    pub async fn execute(self) -> Result<()> {
        let project_dir = match self.project_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let config = DepstrapConfig::load_with_optional(self.config).await?;

        let ctx = CommandContext {
            project_dir,
            config,
        };
        self.command.execute(&ctx).await
    }
}

impl Commands {
    async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Resolve(cmd) => cmd.execute(ctx),
            Self::Prepare(cmd) => cmd.execute(ctx).await,
            Self::Status(cmd) => cmd.execute(),
            Self::Fetch(cmd) => cmd.execute(ctx).await,
            Self::Check(cmd) => cmd.execute(),
        }
    }
}

//! Inspect or update the `build.status` marker of a product directory.

use crate::status::BuildStatus;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct StatusCommand {
    #[command(subcommand)]
    action: StatusAction,
}

#[derive(Subcommand, Debug)]
enum StatusAction {
    /// Print the recorded state
    Show {
        dir: PathBuf,
    },
    /// Create or reset the marker to failure
    Init {
        dir: PathBuf,
    },
    /// Record a successful build
    Success {
        dir: PathBuf,
    },
    /// Record a failed build
    Failure {
        dir: PathBuf,
    },
}

impl StatusCommand {
    pub fn execute(self) -> Result<()> {
        match self.action {
            StatusAction::Show {
                dir,
            } => println!("{}", BuildStatus::load(&dir)?.read()?),
            StatusAction::Init {
                dir,
            } => {
                BuildStatus::init(&dir)?;
            }
            StatusAction::Success {
                dir,
            } => BuildStatus::load(&dir)?.set_success()?,
            StatusAction::Failure {
                dir,
            } => BuildStatus::load(&dir)?.set_failure()?,
        }
        Ok(())
    }
}

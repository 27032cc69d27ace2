//! Mirror a remote file.
//!
//! Without `--sha256` the file is downloaded unconditionally. With it, an existing
//! copy that already matches is kept and a fresh download must match.

use super::CommandContext;
use crate::core::DepstrapError;
use crate::fetch::{self, ArchiveKind, SyncOutcome};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ArchiveFormat {
    Zip,
    Tar,
}

impl From<ArchiveFormat> for ArchiveKind {
    fn from(format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::Zip => Self::Zip,
            ArchiveFormat::Tar => Self::Tar,
        }
    }
}

#[derive(Args, Debug)]
pub struct FetchCommand {
    /// Source URL (`http(s)://` or `file://`)
    #[arg(long)]
    pub url: String,

    /// Local path to write
    #[arg(long, value_name = "PATH")]
    pub target: PathBuf,

    /// Expected SHA-256 digest, optionally prefixed with `sha256:`
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,

    /// Extract the downloaded archive into this directory
    #[arg(long, value_name = "DIR")]
    pub extract_to: Option<PathBuf>,

    /// Archive format (default: guessed from the target, then the URL)
    #[arg(long, value_enum)]
    pub kind: Option<ArchiveFormat>,

    /// Download attempts
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_attempts: Option<u64>,
}

impl FetchCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let max_attempts = match self.max_attempts {
            Some(n) => usize::try_from(n)?,
            None => ctx.config.max_download_attempts,
        };

        match &self.sha256 {
            Some(sha256) => {
                match fetch::sync_remote_file(sha256, &self.url, &self.target, max_attempts).await? {
                    SyncOutcome::AlreadyPresent => {
                        println!("{} {} is up to date", "✓".green(), self.target.display());
                    }
                    SyncOutcome::Downloaded => {
                        println!("{} Downloaded {}", "✓".green(), self.target.display());
                    }
                }
            }
            None => {
                fetch::try_download(&self.url, &self.target, max_attempts).await?;
                println!("{} Downloaded {}", "✓".green(), self.target.display());
            }
        }

        if let Some(dir) = &self.extract_to {
            let kind = self.archive_kind()?;
            let archive = self.target.clone();
            let dest = dir.clone();
            let count = tokio::task::spawn_blocking(move || kind.extract(&archive, &dest))
                .await
                .context("Extraction task panicked")??;
            println!("{} Extracted {count} entries into {}", "✓".green(), dir.display());
        }
        Ok(())
    }

    fn archive_kind(&self) -> Result<ArchiveKind> {
        if let Some(kind) = self.kind {
            return Ok(kind.into());
        }
        ArchiveKind::from_name(&self.target.to_string_lossy())
            .or_else(|| ArchiveKind::from_name(&self.url))
            .ok_or_else(|| {
                DepstrapError::ConfigError {
                    message: format!(
                        "Cannot tell the archive format of {}; pass --kind zip or --kind tar",
                        self.target.display()
                    ),
                }
                .into()
            })
    }
}

//! Fetching remote files and archives.
//!
//! Downloads are retried with exponential backoff up to a caller-supplied
//! attempt budget. After every failed attempt the partially written target is
//! deleted, so a target path either holds a complete download or nothing.
//! Besides `http(s)://`, `file://` URLs are accepted and copied from the local
//! filesystem, which is how offline mirrors are served.
//!
//! # Example
//!
//! ```rust,no_run
//! use depstrap::fetch::{ArchiveKind, MirroredArchive, SyncOutcome};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let archive = MirroredArchive::new(
//!     ArchiveKind::Tar,
//!     "sha256:8fd4a4cbd1d39bd8e7cfb3a3a9c7a3d1b4bd5e3d0f3c2b4d2a2e1b0c9d8e7f6a",
//!     "https://example.com/zeromq-4.0.4.tar.gz",
//!     "deps/downloads/zeromq-4.0.4.tar.gz",
//! );
//! if archive.sync(10).await? == SyncOutcome::Downloaded {
//!     archive.extract(Path::new("deps/zeromq-4.0.4"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod checksum;

pub use archive::{ArchiveKind, extract_tar, extract_zip, flatten_single_root};
pub use checksum::{normalize_checksum, sha256_file, verify_sha256};

use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::DepstrapError;
use crate::utils::{ensure_parent_dir, remove_path};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

/// Result of [`sync_remote_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The target already existed with the expected checksum.
    AlreadyPresent,
    /// The target was (re-)downloaded and verified.
    Downloaded,
}

/// Delays between attempts: doubling from `STARTING_BACKOFF_DELAY_MS`, capped.
fn retry_delays(max_attempts: usize) -> impl Iterator<Item = Duration> {
    // tokio-retry yields factor * base^n, so base 2 doubles
    ExponentialBackoff::from_millis(2)
        .factor(STARTING_BACKOFF_DELAY_MS / 2)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
        .take(max_attempts.saturating_sub(1))
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("depstrap/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// One download attempt, writing `url` to `target`.
async fn download_once(client: &reqwest::Client, url: &Url, target: &Path) -> Result<()> {
    ensure_parent_dir(target)?;

    if url.scheme() == "file" {
        let source = url.to_file_path().map_err(|()| anyhow!("Not a local file URL: {url}"))?;
        tokio::fs::copy(&source, target)
            .await
            .with_context(|| format!("Failed to copy {}", source.display()))?;
        return Ok(());
    }

    let mut response = client.get(url.clone()).send().await?.error_for_status()?;
    let expected_len = response.content_length();

    let mut file = tokio::fs::File::create(target)
        .await
        .with_context(|| format!("Failed to create {}", target.display()))?;
    let mut received: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
    }
    file.flush().await?;

    if let Some(expected) = expected_len
        && received < expected
    {
        bail!("Content too short: received {received} of {expected} bytes");
    }
    Ok(())
}

/// Download `url` to `target`, retrying up to `max_attempts` times.
///
/// A `max_attempts` of zero is treated as one attempt.
///
/// # Errors
///
/// [`DepstrapError::DownloadFailed`] once every attempt has failed; the target
/// does not exist afterwards.
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::fetch::try_download;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// try_download(
///     "https://github.com/khklau/gtest_bootstrap/archive/master.zip",
///     Path::new("deps/downloads/gtest.zip"),
///     10,
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn try_download(url: &str, target: &Path, max_attempts: usize) -> Result<()> {
    let max_attempts = max_attempts.max(1);
    let parsed = Url::parse(url).map_err(|e| DepstrapError::DownloadFailed {
        url: url.to_string(),
        attempts: 0,
        reason: format!("invalid URL: {e}"),
    })?;
    let client = http_client()?;

    let mut attempt = 0usize;
    let result = Retry::spawn(retry_delays(max_attempts), || {
        attempt += 1;
        let current = attempt;
        let client = &client;
        let parsed = &parsed;
        async move {
            debug!(url = %parsed, target = %target.display(), attempt = current, "Downloading");
            match download_once(client, parsed, target).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!(url = %parsed, attempt = current, max_attempts, error = %e, "Download attempt failed");
                    if let Err(cleanup) = remove_path(target) {
                        warn!(target = %target.display(), error = %cleanup, "Failed to remove partial download");
                    }
                    Err(e)
                }
            }
        }
    })
    .await;

    match result {
        Ok(()) => {
            info!(url, target = %target.display(), attempts = attempt, "Downloaded");
            Ok(())
        }
        Err(e) => Err(DepstrapError::DownloadFailed {
            url: url.to_string(),
            attempts: attempt,
            reason: format!("{e:#}"),
        }
        .into()),
    }
}

async fn verify_blocking(path: &Path, sha256: &str) -> Result<()> {
    let path = path.to_path_buf();
    let sha256 = sha256.to_string();
    tokio::task::spawn_blocking(move || verify_sha256(&path, &sha256))
        .await
        .context("Checksum task panicked")?
}

/// Make `target` a verified copy of `url`.
///
/// An existing target with the expected checksum is kept as is. A stale or
/// unreadable target is deleted and downloaded again; the fresh download is
/// verified and deleted again if it does not match.
///
/// # Errors
///
/// [`DepstrapError::DownloadFailed`] or [`DepstrapError::ChecksumMismatch`].
pub async fn sync_remote_file(
    sha256: &str,
    url: &str,
    target: &Path,
    max_attempts: usize,
) -> Result<SyncOutcome> {
    if target.is_file() {
        match verify_blocking(target, sha256).await {
            Ok(()) => {
                debug!(target = %target.display(), "Mirror copy is current");
                return Ok(SyncOutcome::AlreadyPresent);
            }
            Err(e) => {
                info!(target = %target.display(), reason = %e, "Discarding stale mirror copy");
                remove_path(target)?;
            }
        }
    } else if target.exists() {
        remove_path(target)?;
    }

    try_download(url, target, max_attempts).await?;

    if let Err(e) = verify_blocking(target, sha256).await {
        remove_path(target)?;
        return Err(e);
    }
    Ok(SyncOutcome::Downloaded)
}

async fn extract_remote(url: &str, dir: &Path, max_attempts: usize, kind: ArchiveKind) -> Result<usize> {
    let scratch = tempfile::Builder::new()
        .prefix("depstrap-")
        .tempdir()
        .context("Failed to create temporary download directory")?;
    let archive_path = scratch.path().join(format!("download.{kind}"));

    try_download(url, &archive_path, max_attempts).await?;

    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || kind.extract(&archive_path, &dir))
        .await
        .context("Extraction task panicked")?
}

/// Download a zip archive to a temporary location and extract it into `dir`.
///
/// The downloaded archive is removed afterwards whether extraction succeeds or not.
pub async fn extract_remote_zip(url: &str, dir: &Path, max_attempts: usize) -> Result<usize> {
    extract_remote(url, dir, max_attempts, ArchiveKind::Zip).await
}

/// Download a tar archive (plain or gzip) and extract it into `dir`.
pub async fn extract_remote_tar(url: &str, dir: &Path, max_attempts: usize) -> Result<usize> {
    extract_remote(url, dir, max_attempts, ArchiveKind::Tar).await
}

/// An archive mirrored to a local path and pinned to a checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredArchive {
    pub kind: ArchiveKind,
    pub sha256: String,
    pub url: String,
    pub target: PathBuf,
}

impl MirroredArchive {
    pub fn new(
        kind: ArchiveKind,
        sha256: impl Into<String>,
        url: impl Into<String>,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            sha256: sha256.into(),
            url: url.into(),
            target: target.into(),
        }
    }

    /// Bring the local copy up to date. See [`sync_remote_file`].
    pub async fn sync(&self, max_attempts: usize) -> Result<SyncOutcome> {
        sync_remote_file(&self.sha256, &self.url, &self.target, max_attempts).await
    }

    /// Extract the local copy into `dir`.
    pub fn extract(&self, dir: &Path) -> Result<usize> {
        self.kind.extract(&self.target, dir)
    }
}

impl fmt::Display for MirroredArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.url, self.target.display())
    }
}

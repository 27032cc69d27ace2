//! SHA-256 checksums of downloaded files.

use crate::core::DepstrapError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

/// Prefix accepted (and ignored) in front of expected checksums.
const SHA256_PREFIX: &str = "sha256:";

/// Compute the lowercase hex SHA-256 digest of a file.
///
/// The file is streamed through the hasher, so archives of any size are fine.
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::fetch::sha256_file;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let digest = sha256_file(Path::new("deps/downloads/gtest.zip"))?;
/// assert_eq!(digest.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;

    Ok(hex::encode(hasher.finalize()))
}

/// Canonical form of an expected checksum: no `sha256:` prefix, lowercase.
pub fn normalize_checksum(expected: &str) -> String {
    let trimmed = expected.trim();
    let digest = match trimmed.get(..SHA256_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SHA256_PREFIX) => &trimmed[SHA256_PREFIX.len()..],
        _ => trimmed,
    };
    digest.to_ascii_lowercase()
}

/// Check a file against an expected SHA-256 digest.
///
/// `expected` may carry a `sha256:` prefix and is compared case-insensitively.
///
/// # Errors
///
/// [`DepstrapError::ChecksumMismatch`] when the digests differ, or an I/O error if
/// the file cannot be read.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let expected = normalize_checksum(expected);
    let actual = sha256_file(path)?;

    if actual != expected {
        return Err(DepstrapError::ChecksumMismatch {
            path: path.display().to_string(),
            expected,
            actual,
        }
        .into());
    }

    debug!(path = %path.display(), sha256 = %actual, "Checksum verified");
    Ok(())
}

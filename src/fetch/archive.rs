//! Zip and tar extraction.
//!
//! Every entry path is checked before anything is written: absolute paths and
//! `..` components are rejected with [`DepstrapError::ArchiveError`], so an
//! archive can never write outside the directory it is extracted into. An archive
//! rejected part-way may leave the entries before the offending one on disk.

use crate::core::DepstrapError;
use crate::utils::{ensure_dir, ensure_parent_dir};
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Scratch name used while hoisting a single top-level directory.
const FLATTEN_SCRATCH: &str = ".depstrap-flatten";

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    /// Plain or gzip-compressed tar; compression is detected from the content.
    Tar,
}

impl ArchiveKind {
    /// Guess the format from a file name or URL.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar") || lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Extract `archive` into `dir`, returning the number of entries written.
    pub fn extract(self, archive: &Path, dir: &Path) -> Result<usize> {
        match self {
            Self::Zip => extract_zip(archive, dir),
            Self::Tar => extract_tar(archive, dir),
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::Tar => f.write_str("tar"),
        }
    }
}

fn archive_error(archive: &Path, reason: impl Into<String>) -> DepstrapError {
    DepstrapError::ArchiveError {
        path: archive.display().to_string(),
        reason: reason.into(),
    }
}

/// Relative path of an entry, or an error if it would escape the target.
fn checked_entry_path(archive: &Path, name: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(archive_error(
                    archive,
                    format!("entry '{}' escapes the extraction directory", name.display()),
                )
                .into());
            }
        }
    }
    Ok(relative)
}

/// Extract a zip archive into `dir`, creating it if needed.
///
/// Unix permission bits stored in the archive are restored, so bundled build
/// scripts stay executable.
///
/// # Errors
///
/// [`DepstrapError::ArchiveError`] if the file is not a readable zip archive or an
/// entry would be written outside `dir`.
pub fn extract_zip(archive: &Path, dir: &Path) -> Result<usize> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| archive_error(archive, e.to_string()))?;

    ensure_dir(dir)?;
    let mut written = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| archive_error(archive, e.to_string()))?;
        let relative = checked_entry_path(archive, Path::new(entry.name()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let out_path = dir.join(&relative);

        if entry.is_dir() {
            ensure_dir(&out_path)?;
        } else {
            ensure_parent_dir(&out_path)?;
            let mut out = File::create(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            io::copy(&mut entry, &mut out)
                .with_context(|| format!("Failed to extract {}", out_path.display()))?;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .with_context(|| format!("Failed to set permissions on {}", out_path.display()))?;
        }

        written += 1;
    }

    debug!(archive = %archive.display(), dir = %dir.display(), entries = written, "Extracted zip");
    Ok(written)
}

/// Extract a tar archive, optionally gzip-compressed, into `dir`.
///
/// # Errors
///
/// [`DepstrapError::ArchiveError`] if the archive is corrupt or an entry would be
/// written outside `dir`.
pub fn extract_tar(archive: &Path, dir: &Path) -> Result<usize> {
    let mut file = File::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()))?;

    let mut magic = [0u8; 2];
    let gzipped = file.read(&mut magic)? == 2 && magic == [0x1f, 0x8b];
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let mut tar = tar::Archive::new(reader);
    tar.set_preserve_permissions(true);

    ensure_dir(dir)?;
    let mut written = 0;

    for entry in tar.entries().map_err(|e| archive_error(archive, e.to_string()))? {
        let mut entry = entry.map_err(|e| archive_error(archive, e.to_string()))?;
        let name = entry.path().map_err(|e| archive_error(archive, e.to_string()))?.into_owned();
        let relative = checked_entry_path(archive, &name)?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        entry.unpack_in(dir).map_err(|e| archive_error(archive, e.to_string()))?;
        written += 1;
    }

    debug!(
        archive = %archive.display(),
        dir = %dir.display(),
        entries = written,
        gzipped,
        "Extracted tar"
    );
    Ok(written)
}

/// Hoist the contents of a lone top-level directory into `dir`.
///
/// Source archives usually wrap everything in `<project>-<version>/`. When `dir`
/// holds exactly one entry and it is a directory, its children are moved up and
/// the wrapper removed. Returns whether anything was moved.
pub fn flatten_single_root(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<io::Result<Vec<_>>>()?;

    if entries.len() != 1 {
        return Ok(false);
    }
    let Some(wrapper) = entries.pop() else {
        return Ok(false);
    };
    if !wrapper.file_type()?.is_dir() {
        return Ok(false);
    }

    // Move aside first in case a child shares the wrapper's name
    let scratch = dir.join(FLATTEN_SCRATCH);
    fs::rename(wrapper.path(), &scratch)
        .with_context(|| format!("Failed to move {}", wrapper.path().display()))?;

    for child in fs::read_dir(&scratch)? {
        let child = child?;
        let dest = dir.join(child.file_name());
        fs::rename(child.path(), &dest)
            .with_context(|| format!("Failed to move {} to {}", child.path().display(), dest.display()))?;
    }
    fs::remove_dir(&scratch)
        .with_context(|| format!("Failed to remove {}", scratch.display()))?;

    debug!(dir = %dir.display(), wrapper = ?wrapper.file_name(), "Flattened archive root");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_tar(path: &Path, entries: &[(&str, &str)], gzip: bool) {
        let file = File::create(path).unwrap();
        let sink: Box<dyn Write> = if gzip {
            Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::default()))
        } else {
            Box::new(file)
        };
        let mut builder = tar::Builder::new(sink);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().flush().unwrap();
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ArchiveKind::from_name("gtest_bootstrap-1.8.zip"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_name("zeromq-4.0.4.tar.gz"), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::from_name("asio.TGZ"), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::from_name("readme.txt"), None);
    }

    #[test]
    fn test_extract_zip() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(&archive, &[("wscript", "def build(bld): pass"), ("src/main.cpp", "int main() {}")]);

        let out = temp.path().join("out");
        let written = extract_zip(&archive, &out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(out.join("src/main.cpp")).unwrap(), "int main() {}");
    }

    #[test]
    fn test_extract_zip_rejects_traversal() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../escaped.txt", "gotcha")]);

        let err = extract_zip(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepstrapError>(),
            Some(DepstrapError::ArchiveError { .. })
        ));
        assert!(!temp.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_extract_zip_rejects_garbage() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("not.zip");
        std::fs::write(&archive, "definitely not a zip").unwrap();

        let err = extract_zip(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepstrapError>(),
            Some(DepstrapError::ArchiveError { .. })
        ));
    }

    #[test]
    fn test_extract_plain_and_gzipped_tar() {
        let temp = tempdir().unwrap();
        for gzip in [false, true] {
            let archive = temp.path().join(format!("bundle-{gzip}.tar"));
            write_tar(&archive, &[("include/zmq.hpp", "// zmq"), ("wscript", "")], gzip);

            let out = temp.path().join(format!("out-{gzip}"));
            assert_eq!(extract_tar(&archive, &out).unwrap(), 2);
            assert_eq!(std::fs::read_to_string(out.join("include/zmq.hpp")).unwrap(), "// zmq");
        }
    }

    #[test]
    fn test_checked_entry_path() {
        let archive = Path::new("a.tar");
        assert_eq!(
            checked_entry_path(archive, Path::new("./a/b.txt")).unwrap(),
            PathBuf::from("a/b.txt")
        );
        assert!(checked_entry_path(archive, Path::new("a/../../b")).is_err());
        assert!(checked_entry_path(archive, Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_flatten_single_root() {
        let temp = tempdir().unwrap();
        let wrapper = temp.path().join("gtest_bootstrap-1.8");
        std::fs::create_dir_all(wrapper.join("gtest_bootstrap-1.8")).unwrap();
        std::fs::write(wrapper.join("wscript"), "").unwrap();

        assert!(flatten_single_root(temp.path()).unwrap());
        assert!(temp.path().join("wscript").is_file());
        // A child sharing the wrapper's name survives the move
        assert!(temp.path().join("gtest_bootstrap-1.8").is_dir());
        assert!(!temp.path().join(FLATTEN_SCRATCH).exists());
    }

    #[test]
    fn test_flatten_leaves_multiple_entries_alone() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("wscript"), "").unwrap();

        assert!(!flatten_single_root(temp.path()).unwrap());
        assert!(temp.path().join("src").is_dir());
    }
}

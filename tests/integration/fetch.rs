//! Integration tests for `depstrap fetch` and the fetch API over `file://` URLs.

use anyhow::Result;
use depstrap::core::DepstrapError;
use depstrap::fetch::{self, ArchiveKind, MirroredArchive, SyncOutcome};
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;

use crate::common::TestProject;

fn file_url(path: &Path) -> String {
    reqwest::Url::from_file_path(path).unwrap().to_string()
}

fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    let encoder = flate2::write::GzEncoder::new(std::fs::File::create(path)?, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *content)?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

#[test]
fn test_fetch_and_extract() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.deps_path().join("src.tar.gz");
    write_tar_gz(&source, &[("capnp/schema.capnp", b"@0xdeadbeef;")])?;

    let target = project.deps_path().join("mirror/capnp.tar.gz");
    let out = project.deps_path().join("out");
    project
        .depstrap()
        .args(["fetch", "--url", &file_url(&source)])
        .arg("--target")
        .arg(&target)
        .arg("--extract-to")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1 entries"));

    assert_eq!(std::fs::read(out.join("capnp/schema.capnp"))?, b"@0xdeadbeef;");
    Ok(())
}

#[test]
fn test_fetch_pinned_checksum() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.deps_path().join("hello.txt");
    std::fs::write(&source, "Hello, World!")?;
    let target = project.deps_path().join("copy.txt");
    let sha = "sha256:DFFD6021BB2BD5B0AF676290809EC3A53191DD81C7F70A4B28688A362182986F";

    let run = || {
        let mut cmd = project.depstrap();
        cmd.args(["fetch", "--url", &file_url(&source), "--sha256", sha]).arg("--target").arg(&target);
        cmd
    };

    run().assert().success().stdout(predicate::str::contains("Downloaded"));
    run().assert().success().stdout(predicate::str::contains("is up to date"));

    std::fs::write(&source, "tampered")?;
    std::fs::remove_file(&target)?;
    run().assert().code(1).stderr(predicate::str::contains("Checksum mismatch"));
    assert!(!target.exists());
    Ok(())
}

#[test]
fn test_fetch_needs_archive_kind() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.deps_path().join("blob");
    std::fs::write(&source, "data")?;

    project
        .depstrap()
        .args(["fetch", "--url", &file_url(&source)])
        .arg("--target")
        .arg(project.deps_path().join("blob.copy"))
        .arg("--extract-to")
        .arg(project.deps_path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--kind zip or --kind tar"));
    Ok(())
}

#[tokio::test]
async fn test_zip_path_traversal_is_rejected() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let archive = temp.path().join("evil.zip");
    let mut writer = zip::ZipWriter::new(std::fs::File::create(&archive)?);
    writer.start_file("../escape.txt", zip::write::SimpleFileOptions::default())?;
    writer.write_all(b"gotcha")?;
    writer.finish()?;

    let dest = temp.path().join("dest");
    let err = fetch::extract_remote_zip(&file_url(&archive), &dest, 1).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<DepstrapError>(), Some(DepstrapError::ArchiveError { .. })));
    assert!(!temp.path().join("escape.txt").exists());
    Ok(())
}

#[tokio::test]
async fn test_mirrored_tar_archive() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let source = temp.path().join("proto.tgz");
    write_tar_gz(&source, &[("include/proto.h", b"#pragma once\n"), ("lib/libproto.a", b"!<arch>\n")])?;
    let sha = fetch::sha256_file(&source)?;

    let mirror = MirroredArchive::new(ArchiveKind::Tar, sha, file_url(&source), temp.path().join("cache/proto.tgz"));
    assert_eq!(mirror.sync(2).await?, SyncOutcome::Downloaded);
    assert_eq!(mirror.sync(2).await?, SyncOutcome::AlreadyPresent);

    let prefix = temp.path().join("prefix");
    assert_eq!(mirror.extract(&prefix)?, 2);
    assert!(prefix.join("include/proto.h").is_file());
    Ok(())
}

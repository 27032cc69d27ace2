//! Test fixtures for dependency manifests and bootstrap mirrors

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILE_NAME;
use crate::tools::ToolSpec;

/// Test fixture for creating sample dependency.json files
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    pub content: String,
    pub name: String,
}

impl ManifestFixture {
    /// A project with two independent dependencies, one of them nested
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
{
    "product": "app",
    "version": "1.0",
    "dependencies": [
        {
            "product": "gmock",
            "version": "1.7.0",
            "dependencies": [{"product": "gtest", "version": "1.7.0"}]
        },
        {"product": "glog", "version": "0.3.3"}
    ]
}
"#
            .trim()
            .to_string(),
        }
    }

    /// Two branches asking for different versions of the same product
    pub fn version_conflict() -> Self {
        Self {
            name: "version_conflict".to_string(),
            content: r#"
{
    "product": "app",
    "version": "1.0",
    "dependencies": [
        {"product": "capnproto", "version": "0.5.3", "dependencies": [{"product": "kj", "version": "0.5.3"}]},
        {"product": "turbo", "version": "0.2", "dependencies": [{"product": "kj", "version": "0.6.1"}]}
    ]
}
"#
            .trim()
            .to_string(),
        }
    }

    /// Two branches sharing the same product and version
    pub fn diamond() -> Self {
        Self {
            name: "diamond".to_string(),
            content: r#"
{
    "product": "app",
    "version": "1.0",
    "dependencies": [
        {"product": "A", "version": "1.0", "dependencies": [{"product": "B", "version": "2.0"}]},
        {"product": "C", "version": "1.0", "dependencies": [{"product": "B", "version": "2.0"}]}
    ]
}
"#
            .trim()
            .to_string(),
        }
    }

    /// Missing the required `version` field
    pub fn missing_version() -> Self {
        Self {
            name: "missing_version".to_string(),
            content: r#"{"product": "app", "dependencies": []}"#.to_string(),
        }
    }

    /// Not JSON at all
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: r#"{"product": "app", "version": "1.0", "dependencies": ["#.to_string(),
        }
    }

    /// A bare product with no dependencies
    pub fn leaf(product: &str, version: &str) -> Self {
        Self {
            name: format!("{product}-{version}"),
            content: format!(r#"{{"product": "{product}", "version": "{version}"}}"#),
        }
    }

    /// Write the manifest to a directory, creating it if needed
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        fs::write(&manifest_path, &self.content)?;
        Ok(manifest_path)
    }
}

/// A local mirror laid out like the bootstrap repository host.
///
/// Point `bootstrap_url_base` at [`MirrorFixture::url_base`] and bootstraps download
/// their archives over `file://`.
#[derive(Debug)]
pub struct MirrorFixture {
    root: PathBuf,
}

impl MirrorFixture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// `file://` URL of the mirror root.
    pub fn url_base(&self) -> Result<String> {
        reqwest::Url::from_directory_path(&self.root)
            .map(|url| url.to_string())
            .map_err(|()| anyhow::anyhow!("Not an absolute path: {}", self.root.display()))
    }

    /// Publish a bootstrap archive for `tool` at `version` whose files sit under a
    /// single top-level directory, the way hosted source archives do.
    pub fn publish(&self, tool: &ToolSpec, version: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
        let dir = self.root.join(tool.repository).join("archive");
        fs::create_dir_all(&dir)?;
        let path = dir.join(tool.archive_file(version));

        let file = fs::File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = zip::ZipWriter::new(file);
        let top = format!("{}-{version}", tool.repository);
        for (name, content) in files {
            writer.start_file(format!("{top}/{name}"), zip::write::SimpleFileOptions::default())?;
            writer.write_all(content.as_bytes())?;
        }
        writer.finish()?;
        Ok(path)
    }
}

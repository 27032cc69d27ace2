//! Registry of the native dependencies depstrap knows how to bootstrap.
//!
//! Each [`ToolSpec`] records where a dependency's bootstrap project is published,
//! which header proves its headers are installed, which shared and static libraries
//! it must produce, and whether it ships a compiler binary.
//!
//! | Tool | Probe header | Libraries | Compiler |
//! |------|--------------|-----------|----------|
//! | asio | `asio.hpp` | asio (shared, static) | |
//! | beam | `beam/queue/unordered_mixed.hpp` | beam_internet, beam_duplex, beam_message | |
//! | capnproto | `capnp/message.h` | capnp, kj (static) | `capnp` |
//! | enet | `enet/enet.h` | enet (shared, static) | |
//! | glog | `glog/logging.h` | glog (shared) | |
//! | gmock | `gmock/gmock.h` | gmock, gmock_main (static) | |
//! | gtest | `gtest/gtest.h` | gtest, gtest_main (static) | |
//! | protobuf | `google/protobuf/message.h` | protobuf (shared) | `protoc` |
//! | snapbox2d | `SnapBox2D/snapshot.hpp` | SnapBox2D (shared, static) | |
//! | turbo | `turbo/toolset/attribute.hpp` | turbo_algorithm, turbo_filesystem, turbo_ipc, turbo_process | |
//! | zeromq | `zmq.hpp` | zmq (shared) | |

use crate::constants::MASTER_VERSION;
use crate::core::DepstrapError;
use crate::layout::OutputTree;
use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use strsim::levenshtein;
use tracing::debug;

/// Maximum edit distance, as a percentage of the name's length, for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Names of every registered tool, sorted.
pub const KNOWN_TOOLS: &[&str] = &[
    "asio",
    "beam",
    "capnproto",
    "enet",
    "glog",
    "gmock",
    "gtest",
    "protobuf",
    "snapbox2d",
    "turbo",
    "zeromq",
];

/// Static description of one known dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Name used in manifests.
    pub name: &'static str,
    /// Human-readable name for log messages.
    pub title: &'static str,
    /// Repository publishing the bootstrap project.
    pub repository: &'static str,
    /// Release archives are named `<archive_prefix>-<version>.zip`.
    pub archive_prefix: &'static str,
    /// Probe header, relative to the include directory.
    pub header: &'static str,
    pub shared_libs: &'static [&'static str],
    pub static_libs: &'static [&'static str],
    /// Compiler binary installed under `bin`, if any.
    pub compiler: Option<&'static str>,
    /// Whether a successful install must contain a `bin` directory.
    pub installs_binaries: bool,
}

const BEAM_LIBS: &[&str] = &["beam_internet", "beam_duplex", "beam_message"];
const TURBO_LIBS: &[&str] = &["turbo_algorithm", "turbo_filesystem", "turbo_ipc", "turbo_process"];

static REGISTRY: &[ToolSpec] = &[
    ToolSpec {
        name: "asio",
        title: "Asio",
        repository: "asio_bootstrap",
        archive_prefix: "asio_bootstrap",
        header: "asio.hpp",
        shared_libs: &["asio"],
        static_libs: &["asio"],
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "beam",
        title: "Beam",
        repository: "beam",
        archive_prefix: "beam",
        header: "beam/queue/unordered_mixed.hpp",
        shared_libs: BEAM_LIBS,
        static_libs: BEAM_LIBS,
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "capnproto",
        title: "Cap'n Proto",
        repository: "capnproto_bootstrap",
        archive_prefix: "capnproto_bootstrap",
        header: "capnp/message.h",
        shared_libs: &[],
        static_libs: &["capnp", "kj"],
        compiler: Some("capnp"),
        installs_binaries: true,
    },
    ToolSpec {
        name: "enet",
        title: "ENet",
        repository: "enet_bootstrap",
        archive_prefix: "enet_bootstrap",
        header: "enet/enet.h",
        shared_libs: &["enet"],
        static_libs: &["enet"],
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "glog",
        title: "Google Log",
        repository: "glog_bootstrap",
        archive_prefix: "glog_bootstrap",
        header: "glog/logging.h",
        shared_libs: &["glog"],
        static_libs: &[],
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "gmock",
        title: "Google Mock",
        repository: "gmock_bootstrap",
        archive_prefix: "gmock_bootstrap",
        header: "gmock/gmock.h",
        shared_libs: &[],
        static_libs: &["gmock", "gmock_main"],
        compiler: None,
        installs_binaries: true,
    },
    ToolSpec {
        name: "gtest",
        title: "Google Test",
        repository: "gtest_bootstrap",
        archive_prefix: "gtest_bootstrap",
        header: "gtest/gtest.h",
        shared_libs: &[],
        static_libs: &["gtest", "gtest_main"],
        compiler: None,
        installs_binaries: true,
    },
    ToolSpec {
        name: "protobuf",
        title: "Protocol Buffers",
        repository: "protobuf_bootstrap",
        archive_prefix: "protobuf_bootstrap",
        header: "google/protobuf/message.h",
        shared_libs: &["protobuf"],
        static_libs: &[],
        compiler: Some("protoc"),
        installs_binaries: true,
    },
    ToolSpec {
        name: "snapbox2d",
        title: "SnapBox2D",
        repository: "snapbox2D",
        archive_prefix: "snapBox2D",
        header: "SnapBox2D/snapshot.hpp",
        shared_libs: &["SnapBox2D"],
        static_libs: &["SnapBox2D"],
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "turbo",
        title: "Turbo",
        repository: "turbo",
        archive_prefix: "turbo",
        header: "turbo/toolset/attribute.hpp",
        shared_libs: TURBO_LIBS,
        static_libs: TURBO_LIBS,
        compiler: None,
        installs_binaries: false,
    },
    ToolSpec {
        name: "zeromq",
        title: "ZeroMQ",
        repository: "zero_bootstrap",
        archive_prefix: "zeromq_bootstrap",
        header: "zmq.hpp",
        shared_libs: &["zmq"],
        static_libs: &[],
        compiler: None,
        installs_binaries: false,
    },
];

/// Look up a tool by manifest name.
///
/// # Errors
///
/// [`DepstrapError::UnknownTool`] for names with no registered tool.
///
/// # Examples
///
/// ```rust
/// use depstrap::tools;
///
/// let gtest = tools::lookup("gtest").unwrap();
/// assert_eq!(
///     gtest.bootstrap_url("https://github.com/khklau", "1.8"),
///     "https://github.com/khklau/gtest_bootstrap/archive/gtest_bootstrap-1.8.zip"
/// );
/// assert!(tools::lookup("boost").is_err());
/// ```
pub fn lookup(name: &str) -> Result<&'static ToolSpec> {
    REGISTRY.iter().find(|tool| tool.name == name).ok_or_else(|| {
        DepstrapError::UnknownTool {
            name: name.to_string(),
        }
        .into()
    })
}

/// Every registered tool, in name order.
pub fn all() -> impl Iterator<Item = &'static ToolSpec> {
    REGISTRY.iter()
}

/// The registered tool name closest to `name`, if any is reasonably close.
pub fn closest_tool_name(name: &str) -> Option<&'static str> {
    let limit = name.len() * SIMILARITY_THRESHOLD_PERCENT / 100;
    KNOWN_TOOLS
        .iter()
        .map(|known| (*known, levenshtein(name, known)))
        .filter(|(_, distance)| *distance <= limit)
        .min_by_key(|(_, distance)| *distance)
        .map(|(known, _)| known)
}

/// Directories a bootstrapped dependency installed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<PathBuf>,
    pub include: PathBuf,
    pub lib: PathBuf,
}

impl InstalledPaths {
    /// The `bin`, `include` and `lib` directories of an install prefix, with `bin`
    /// only when the tool installs binaries.
    pub fn for_tool(tool: &ToolSpec, tree: &OutputTree) -> Self {
        Self {
            bin: tool.installs_binaries.then(|| tree.bin.clone()),
            include: tree.include.clone(),
            lib: tree.lib.clone(),
        }
    }
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

impl ToolSpec {
    /// Archive file name for a version; `master` selects the default branch.
    pub fn archive_file(&self, version: &str) -> String {
        if version.eq_ignore_ascii_case(MASTER_VERSION) {
            format!("{MASTER_VERSION}.zip")
        } else {
            format!("{}-{version}.zip", self.archive_prefix)
        }
    }

    /// Download URL of the bootstrap project for a version.
    pub fn bootstrap_url(&self, base_url: &str, version: &str) -> String {
        format!(
            "{}/{}/archive/{}",
            base_url.trim_end_matches('/'),
            self.repository,
            self.archive_file(version)
        )
    }

    /// Shared libraries to check, including platform-specific extras.
    pub fn shared_libraries(&self) -> Vec<String> {
        let mut libs: Vec<String> = self.shared_libs.iter().map(|l| (*l).to_string()).collect();
        // glog links against libunwind on Linux
        if self.name == "glog" && cfg!(target_os = "linux") {
            let unwind =
                if cfg!(target_arch = "x86_64") { "libunwind-x86_64" } else { "libunwind" };
            libs.push(unwind.to_string());
        }
        libs
    }

    /// Full path of the compiler binary under `bin`.
    pub fn compiler_path(&self, bin: &Path) -> Option<PathBuf> {
        self.compiler.map(|c| bin.join(format!("{c}{}", std::env::consts::EXE_SUFFIX)))
    }

    /// Verify that an installation provides everything this tool needs.
    ///
    /// Checks, in order: the compiler is executable, the probe header is readable,
    /// every shared (`lib<name>.so`) and static (`lib<name>.a`) library is readable.
    ///
    /// # Errors
    ///
    /// The first failure as [`DepstrapError::MissingExecutable`],
    /// [`DepstrapError::MissingHeader`] or [`DepstrapError::MissingLibrary`].
    pub fn check_installation(&self, paths: &InstalledPaths) -> Result<()> {
        if self.compiler.is_some() {
            let bin = paths.bin.as_deref().unwrap_or_else(|| Path::new("bin"));
            if let Some(compiler) = self.compiler_path(bin)
                && !is_executable(&compiler)
            {
                return Err(DepstrapError::MissingExecutable {
                    name: self.title.to_string(),
                    path: compiler.display().to_string(),
                }
                .into());
            }
        }

        let header = paths.include.join(self.header);
        if !is_readable(&header) {
            return Err(DepstrapError::MissingHeader {
                name: self.title.to_string(),
                path: header.display().to_string(),
            }
            .into());
        }

        let shared = self.shared_libraries().into_iter().map(|l| format!("lib{l}.so"));
        let statics = self.static_libs.iter().map(|l| format!("lib{l}.a"));
        for file_name in shared.chain(statics) {
            let library = paths.lib.join(&file_name);
            if !is_readable(&library) {
                return Err(DepstrapError::MissingLibrary {
                    name: self.title.to_string(),
                    path: library.display().to_string(),
                }
                .into());
            }
        }

        debug!(tool = self.name, include = %paths.include.display(), lib = %paths.lib.display(), "Installation verified");
        Ok(())
    }
}

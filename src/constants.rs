//! Global constants used throughout the depstrap codebase.
//!
//! File names, retry parameters and URL defaults that are shared across
//! multiple modules live here so they stay discoverable.

/// Conventional name of a dependency manifest.
pub const MANIFEST_FILE_NAME: &str = "dependency.json";

/// Name of the build-status marker written into a product directory.
pub const STATUS_FILE_NAME: &str = "build.status";

/// Marker value recorded after a successful build.
pub const STATUS_SUCCESS: &str = "success";

/// Marker value recorded before a build starts and after a failed one.
pub const STATUS_FAILURE: &str = "failure";

/// Default number of download attempts before a fetch is considered failed.
pub const DEFAULT_MAX_DOWNLOAD_ATTEMPTS: usize = 10;

/// Starting delay for download retry backoff (50ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 50;

/// Maximum backoff delay between download attempts (2s).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Default base URL hosting the bootstrap repositories of known tools.
pub const DEFAULT_BOOTSTRAP_URL_BASE: &str = "https://github.com/khklau";

/// File whose presence marks a product directory as already extracted.
pub const DEFAULT_ENTRY_FILE: &str = "wscript";

/// Host build tool that builds a bootstrapped dependency.
pub const DEFAULT_BUILD_PROGRAM: &str = "waf";

/// Arguments passed to the host build tool when building a bootstrapped dependency.
pub const DEFAULT_BUILD_ARGS: [&str; 3] = ["prepare", "configure", "build"];

/// Version string that selects a bootstrap repository's default branch.
pub const MASTER_VERSION: &str = "master";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DEPSTRAP_CONFIG_PATH";

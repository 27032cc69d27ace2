//! Test utilities for depstrap
//!
//! Fixtures for `dependency.json` manifests and local bootstrap mirrors, plus
//! once-only logging setup. Available to unit tests and, through the `test-utils`
//! feature, to the integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use depstrap::test_utils::{ManifestFixture, init_test_logging};
//!
//! # fn example(dir: &std::path::Path) -> anyhow::Result<()> {
//! init_test_logging(None);
//! let path = ManifestFixture::basic().write_to(dir)?;
//! assert!(path.ends_with("dependency.json"));
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{ManifestFixture, MirrorFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=depstrap=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

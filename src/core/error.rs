//! Error handling for depstrap
//!
//! This module provides the strongly-typed error enum used across the crate and the
//! user-facing error report printed by the CLI. The design follows two rules:
//! 1. **Strongly-typed errors** so callers (and tests) can tell a version conflict
//!    from a cycle, or a missing manifest from a malformed one
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Manifests**: [`DepstrapError::ManifestNotFound`], [`DepstrapError::MalformedManifest`]
//! - **Resolution**: [`DepstrapError::VersionConflict`], [`DepstrapError::CyclicDependency`],
//!   [`DepstrapError::ProductNotFound`]
//! - **Fetching**: [`DepstrapError::DownloadFailed`], [`DepstrapError::ChecksumMismatch`],
//!   [`DepstrapError::ArchiveError`]
//! - **Bootstrapping**: [`DepstrapError::BuildFailed`], [`DepstrapError::IncompleteInstall`],
//!   [`DepstrapError::MissingHeader`], [`DepstrapError::MissingLibrary`]
//!
//! Library functions return [`anyhow::Result`] and raise these variants for domain
//! failures, so the typed error survives any `.context(...)` added on the way up and
//! can be recovered with `downcast_ref`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depstrap::core::{DepstrapError, user_friendly_error};
//!
//! let error = anyhow::Error::from(DepstrapError::CyclicDependency {
//!     name: "boost".to_string(),
//! });
//! let ctx = user_friendly_error(error);
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for depstrap operations
///
/// Every failure the resolver or its collaborators can report has its own variant.
/// All of them are fatal for the current prepare phase; nothing except downloads is
/// retried internally.
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::core::DepstrapError;
///
/// fn handle_error(error: &DepstrapError) {
///     match error {
///         DepstrapError::VersionConflict { name, existing, conflicting } => {
///             eprintln!("pin {name} to either {existing} or {conflicting}");
///         }
///         DepstrapError::CyclicDependency { name } => {
///             eprintln!("{name} is declared more than once");
///         }
///         _ => eprintln!("{error}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum DepstrapError {
    /// Manifest file missing or unreadable
    ///
    /// Raised when the `dependency.json` a prepare phase starts from does not exist,
    /// or exists but cannot be read.
    #[error("Manifest not found: {path}")]
    ManifestNotFound {
        /// The path that was expected to contain a manifest
        path: String,
    },

    /// Manifest syntax or schema error
    ///
    /// The document is not valid JSON, or a required field (`product`, `version`)
    /// is absent, empty or of the wrong type.
    #[error("Malformed manifest {file}: {reason}")]
    MalformedManifest {
        /// Path of the manifest, or `<inline>` for in-memory documents
        file: String,
        /// What was wrong with it
        reason: String,
    },

    /// The same product was declared with two different versions
    ///
    /// `existing` is always the version discovered first (breadth-first), the one
    /// already in the directory when the second declaration was visited.
    #[error("Version mismatch for {name}: {existing} vs {conflicting}")]
    VersionConflict {
        /// Name of the product declared twice
        name: String,
        /// Version discovered first
        existing: String,
        /// Version that triggered the conflict
        conflicting: String,
    },

    /// A product was visited again after it was already resolved
    ///
    /// This covers genuine cycles as well as diamond dependencies (two parents
    /// requiring the same product at the same version); both are rejected.
    #[error("Cyclic dependency detected for {name}")]
    CyclicDependency {
        /// Name of the product visited twice
        name: String,
    },

    /// Lookup of a name absent from a resolved directory
    #[error("Product '{name}' not found in the resolved dependency directory")]
    ProductNotFound {
        /// Name that was looked up
        name: String,
    },

    /// Lookup of a component absent from a product layout
    #[error("Component '{name}' not found in product '{product}'")]
    ComponentNotFound {
        /// Product layout that was searched
        product: String,
        /// Component name that was looked up
        name: String,
    },

    /// A dependency name with no registered tool
    #[error("No tool is registered for dependency '{name}'")]
    UnknownTool {
        /// Dependency name with no tool definition
        name: String,
    },

    /// Build-status marker missing or unreadable
    #[error("Build status unavailable at {path}: {reason}")]
    BuildStatusUnavailable {
        /// Path of the marker file
        path: String,
        /// Why it could not be used
        reason: String,
    },

    /// Download failed after exhausting all attempts
    #[error("Could not download {url} after {attempts} attempt(s): {reason}")]
    DownloadFailed {
        /// Source URL
        url: String,
        /// Number of attempts made
        attempts: usize,
        /// Error from the last attempt
        reason: String,
    },

    /// Content hash did not match the expected checksum
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// File that was verified
        path: String,
        /// Expected hex digest
        expected: String,
        /// Digest that was computed
        actual: String,
    },

    /// Archive could not be read or extracted
    #[error("Cannot extract archive {path}: {reason}")]
    ArchiveError {
        /// Archive path
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// Required header not readable under an include directory
    #[error("{name} header is not readable: {path}")]
    MissingHeader {
        /// Dependency name
        name: String,
        /// Expected header path
        path: String,
    },

    /// Required library not readable under a library directory
    #[error("{name} library is not readable: {path}")]
    MissingLibrary {
        /// Dependency name
        name: String,
        /// Expected library path
        path: String,
    },

    /// Required compiler binary missing or not executable
    #[error("{name} executable is not executable: {path}")]
    MissingExecutable {
        /// Dependency name
        name: String,
        /// Expected executable path
        path: String,
    },

    /// Bootstrap build exited with a non-zero status
    #[error("{name} preparation failed: build exited with {code}")]
    BuildFailed {
        /// Dependency name
        name: String,
        /// Exit code, or -1 when the process was terminated by a signal
        code: i32,
    },

    /// Build finished but did not produce the expected install trees
    #[error("{name} preparation failed: {missing} not found")]
    IncompleteInstall {
        /// Dependency name
        name: String,
        /// Comma-separated list of missing directories
        missing: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for DepstrapError {
    fn clone(&self) -> Self {
        match self {
            Self::ManifestNotFound {
                path,
            } => Self::ManifestNotFound {
                path: path.clone(),
            },
            Self::MalformedManifest {
                file,
                reason,
            } => Self::MalformedManifest {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::VersionConflict {
                name,
                existing,
                conflicting,
            } => Self::VersionConflict {
                name: name.clone(),
                existing: existing.clone(),
                conflicting: conflicting.clone(),
            },
            Self::CyclicDependency {
                name,
            } => Self::CyclicDependency {
                name: name.clone(),
            },
            Self::ProductNotFound {
                name,
            } => Self::ProductNotFound {
                name: name.clone(),
            },
            Self::ComponentNotFound {
                product,
                name,
            } => Self::ComponentNotFound {
                product: product.clone(),
                name: name.clone(),
            },
            Self::UnknownTool {
                name,
            } => Self::UnknownTool {
                name: name.clone(),
            },
            Self::BuildStatusUnavailable {
                path,
                reason,
            } => Self::BuildStatusUnavailable {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DownloadFailed {
                url,
                attempts,
                reason,
            } => Self::DownloadFailed {
                url: url.clone(),
                attempts: *attempts,
                reason: reason.clone(),
            },
            Self::ChecksumMismatch {
                path,
                expected,
                actual,
            } => Self::ChecksumMismatch {
                path: path.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::ArchiveError {
                path,
                reason,
            } => Self::ArchiveError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::MissingHeader {
                name,
                path,
            } => Self::MissingHeader {
                name: name.clone(),
                path: path.clone(),
            },
            Self::MissingLibrary {
                name,
                path,
            } => Self::MissingLibrary {
                name: name.clone(),
                path: path.clone(),
            },
            Self::MissingExecutable {
                name,
                path,
            } => Self::MissingExecutable {
                name: name.clone(),
                path: path.clone(),
            },
            Self::BuildFailed {
                name,
                code,
            } => Self::BuildFailed {
                name: name.clone(),
                code: *code,
            },
            Self::IncompleteInstall {
                name,
                missing,
            } => Self::IncompleteInstall {
                name: name.clone(),
                missing: missing.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone; keep the kind and the message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying an optional suggestion and extra details for CLI display
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::core::{DepstrapError, ErrorContext};
///
/// let context = ErrorContext::new(DepstrapError::ManifestNotFound {
///     path: "dependency.json".to_string(),
/// })
/// .with_suggestion("Create a dependency.json next to your build script")
/// .with_details("depstrap reads the manifest from the project directory");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying depstrap error
    pub error: DepstrapError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DepstrapError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// The whole cause chain is searched for a [`DepstrapError`], so a typed error
/// wrapped in `anyhow` context is still recognised. I/O errors get filesystem
/// guidance; anything else is reported with its full chain.
///
/// # Examples
///
/// ```rust,no_run
/// use depstrap::core::user_friendly_error;
///
/// let error = anyhow::anyhow!("Something went wrong");
/// let context = user_friendly_error(error);
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(depstrap_error) = error.chain().find_map(|e| e.downcast_ref::<DepstrapError>()) {
        return create_error_context(depstrap_error.clone());
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DepstrapError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check the ownership and permissions of the dependency base directory")
                .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DepstrapError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DepstrapError::Other {
        message,
    })
}

fn create_error_context(error: DepstrapError) -> ErrorContext {
    match &error {
        DepstrapError::ManifestNotFound { path } => {
            let suggestion = format!(
                "Create {path} declaring \"product\", \"version\" and \"dependencies\", or pass --project-dir"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("The prepare phase starts from the dependency.json in the project directory")
        }

        DepstrapError::MalformedManifest { .. } => ErrorContext::new(error)
            .with_suggestion("Every manifest entry needs a non-empty \"product\" and \"version\" string")
            .with_details("Nested \"dependencies\" entries use the same shape as the top-level document"),

        DepstrapError::VersionConflict { name, existing, conflicting } => {
            let suggestion = format!(
                "Declare a single version of '{name}' across all manifests (either {existing} or {conflicting})"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Versions are compared exactly; there is no range or semver negotiation")
        }

        DepstrapError::CyclicDependency { name } => {
            let details = format!(
                "'{name}' was reached twice. Products shared by two parents (diamonds) are rejected the same way as true cycles"
            );
            ErrorContext::new(error)
                .with_suggestion("Declare the shared product only once in the dependency tree")
                .with_details(details)
        }

        DepstrapError::ProductNotFound { name } => {
            let suggestion = format!("Add '{name}' to dependency.json or check its spelling");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DepstrapError::UnknownTool { name } => {
            let suggestion = match crate::tools::closest_tool_name(name) {
                Some(known) => format!("Did you mean '{known}'?"),
                None => format!("Supported dependencies: {}", crate::tools::KNOWN_TOOLS.join(", ")),
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DepstrapError::BuildStatusUnavailable { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'depstrap status init <dir>' or rebuild the dependency")
            .with_details("The marker is written at the start of every bootstrap build"),

        DepstrapError::DownloadFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection, or raise --max-attempts")
            .with_details("Partially downloaded files are removed after each failed attempt"),

        DepstrapError::ChecksumMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Verify the expected SHA-256 checksum, then re-run to fetch a fresh copy")
            .with_details("The mismatching file may be corrupted or tampered with"),

        DepstrapError::BuildFailed { .. } | DepstrapError::IncompleteInstall { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Re-run with --verbose to see the dependency's build output")
        }

        DepstrapError::MissingHeader { .. }
        | DepstrapError::MissingLibrary { .. }
        | DepstrapError::MissingExecutable { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'depstrap prepare' to bootstrap the dependency, or point --prefix at an existing install"),

        _ => ErrorContext::new(error),
    }
}

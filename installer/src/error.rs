//! Error types for the installas CLI.
//!
//! Target and version problems are reported together with the usage text;
//! everything else names the step that failed.

use modproxy::ProxyError;
use thiserror::Error;

/// Errors that can occur while preparing or launching an install.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The last argument is not of the form `[package]@version`.
    #[error("the target should be either package@version or @version, got \"{target}\"")]
    InvalidTarget {
        /// The rejected argument.
        target: String,
    },

    /// The requested version is not a valid module version.
    #[error("version \"{version}\" is invalid")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
        /// Why the version was rejected.
        #[source]
        source: ProxyError,
    },

    /// `go list` failed or printed something unexpected.
    #[error("go list failed: {message}")]
    GoList {
        /// Description of the failure.
        message: String,
    },

    /// The package does not belong to a module.
    #[error("{package} is not part of a module; run installas inside a Go module")]
    NotInModule {
        /// The package that was inspected.
        package: String,
    },

    /// A subprocess could not be started.
    #[error("failed to run {command}")]
    Launch {
        /// The program that failed to start.
        command: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The local proxy could not be built or composed.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl InstallerError {
    /// Returns `true` when the usage text should accompany the message.
    #[must_use]
    pub const fn shows_usage(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. })
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;

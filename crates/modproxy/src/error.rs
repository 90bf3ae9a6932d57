//! Error types for proxy materialization.
//!
//! Validation failures name the rejected value and the rule it broke; I/O
//! failures carry the path of the file or directory being touched so the
//! CLI can report exactly which step of the proxy layout went wrong.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising while validating module identities, building the module
/// archive, writing proxy metadata, or composing the proxy chain.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The module path does not follow the module path rules.
    #[error("malformed module path \"{path}\": {reason}")]
    InvalidModulePath {
        /// The rejected module path.
        path: String,
        /// Description of the violated rule.
        reason: String,
    },

    /// The version is not a valid semantic version.
    #[error("version \"{version}\" is invalid: {reason}")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
        /// Description of the violated rule.
        reason: String,
    },

    /// The version's major component does not agree with the module path.
    #[error("version \"{version}\" does not match module path \"{path}\": {reason}")]
    VersionPathMismatch {
        /// The module path.
        path: String,
        /// The version string.
        version: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// Archives must be built for canonical versions only.
    #[error("version \"{version}\" is not canonical (should be \"{canonical}\")")]
    NonCanonicalVersion {
        /// The version that was supplied.
        version: String,
        /// The canonical spelling of that version.
        canonical: String,
    },

    /// A file in the module tree cannot be stored in a module archive.
    #[error("malformed file path \"{path}\": {reason}")]
    InvalidFilePath {
        /// Slash-separated path relative to the module root.
        path: String,
        /// Description of the violated rule.
        reason: String,
    },

    /// Two files differ only by letter case.
    #[error("case-insensitive file name collision: \"{first}\" and \"{second}\"")]
    PathCollision {
        /// The file seen first.
        first: String,
        /// The file that collided with it.
        second: String,
    },

    /// A file or the module as a whole exceeds the archive size limits.
    #[error("{what} is too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Which file or aggregate was measured.
        what: String,
        /// Measured size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: u64,
    },

    /// The source directory has no `go.mod` to serve.
    #[error("go.mod not found at {path}")]
    MissingManifest {
        /// Where the manifest was expected.
        path: Utf8PathBuf,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {path}")]
    Io {
        /// The file or directory being accessed.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The zip writer failed.
    #[error("failed to write module archive {path}")]
    Archive {
        /// The archive being written.
        path: Utf8PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The proxy directory cannot be expressed as a `file://` URL.
    #[error("cannot derive a file URL for {path}: {reason}")]
    InvalidDirectory {
        /// The rejected directory.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },
}

impl ProxyError {
    /// Wraps an I/O error with the path that produced it.
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`ProxyError`].
pub type Result<T> = std::result::Result<T, ProxyError>;

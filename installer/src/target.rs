//! The `[package]@version` install target.

use crate::error::{InstallerError, Result};
use modproxy::Version;
use std::fmt;

/// Package pattern used when the target omits one.
pub const CURRENT_PACKAGE: &str = ".";

/// A package to install and the version to stamp it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    package: String,
    version: Version,
}

impl InstallTarget {
    /// Parse a target argument such as `./cmd/tool@v0.0.1` or `@v0.0.1`.
    ///
    /// Surrounding whitespace is ignored and the argument is split at its
    /// first `@`. An empty package means the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidTarget`] when there is no `@` and
    /// [`InstallerError::InvalidVersion`] when the version is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use installas::target::InstallTarget;
    ///
    /// let target = InstallTarget::parse("@v1.2.3")?;
    /// assert_eq!(target.package(), ".");
    /// assert_eq!(target.version().as_str(), "v1.2.3");
    /// # Ok::<(), installas::error::InstallerError>(())
    /// ```
    pub fn parse(argument: &str) -> Result<Self> {
        let trimmed = argument.trim();
        let (package, version) =
            trimmed
                .split_once('@')
                .ok_or_else(|| InstallerError::InvalidTarget {
                    target: trimmed.to_owned(),
                })?;
        let version =
            Version::try_from(version).map_err(|source| InstallerError::InvalidVersion {
                version: version.to_owned(),
                source,
            })?;
        let package = if package.is_empty() {
            CURRENT_PACKAGE
        } else {
            package
        };
        Ok(Self {
            package: package.to_owned(),
            version,
        })
    }

    /// The package pattern handed to `go list`.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The version to install.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.version)
    }
}

//! Go-flavoured semantic versions.
//!
//! Module versions carry a mandatory `v` prefix and accept the `vMAJOR` and
//! `vMAJOR.MINOR` shorthands. Pseudo-versions are ordinary semantic versions
//! whose pre-release encodes a commit timestamp and revision.

use crate::error::{ProxyError, Result};
use crate::module::escape_case;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Build metadata tolerated in canonical versions of pre-module majors.
const INCOMPATIBLE: &str = "+incompatible";

static PSEUDO_VERSION: Lazy<Regex> = Lazy::new(pseudo_version_pattern);

#[expect(
    clippy::expect_used,
    reason = "the pattern is a string literal covered by unit tests"
)]
fn pseudo_version_pattern() -> Regex {
    Regex::new(
        r"^v[0-9]+\.(0\.0-|\d+\.\d+-([^+]*\.)?0\.)\d{14}-[A-Za-z0-9]+(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("pseudo-version pattern compiles")
}

/// Components of a parsed version, borrowed from the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parts<'a> {
    major: &'a str,
    minor: &'a str,
    patch: &'a str,
    prerelease: &'a str,
    build: &'a str,
}

/// A validated module version such as `v1.2.3` or
/// `v0.0.0-20230101120000-abcdefabcdef`.
///
/// # Examples
///
/// ```
/// use modproxy::version::Version;
///
/// let version = Version::try_from("v1.2.3")?;
/// assert_eq!(version.major(), "v1");
/// assert!(!version.is_pseudo());
/// # Ok::<(), modproxy::error::ProxyError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Return the version as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the major version, for example `v2`.
    #[must_use]
    pub fn major(&self) -> String {
        format!("v{}", self.parts().major)
    }

    /// Return the build metadata including its leading `+`, or `""`.
    #[must_use]
    pub fn build(&self) -> &str {
        self.parts().build
    }

    /// Return the canonical spelling: shorthands expanded to `vX.Y.Z` and
    /// build metadata dropped, except for `+incompatible`.
    #[must_use]
    pub fn canonical(&self) -> String {
        let parts = self.parts();
        let build = if parts.build == INCOMPATIBLE {
            INCOMPATIBLE
        } else {
            ""
        };
        format!(
            "v{}.{}.{}{}{}",
            parts.major, parts.minor, parts.patch, parts.prerelease, build
        )
    }

    /// Returns `true` when the version is already in canonical form.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.canonical() == self.0
    }

    /// Returns `true` for pseudo-versions, the synthesized versions that
    /// encode a base version, a UTC timestamp and an abbreviated revision.
    ///
    /// # Examples
    ///
    /// ```
    /// use modproxy::version::Version;
    ///
    /// let pseudo = Version::try_from("v0.0.0-20230101120000-abcdefabcdef")?;
    /// assert!(pseudo.is_pseudo());
    /// # Ok::<(), modproxy::error::ProxyError>(())
    /// ```
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        self.0.matches('-').count() >= 2 && PSEUDO_VERSION.is_match(&self.0)
    }

    /// Return the version with uppercase letters escaped for use in proxy
    /// file names.
    #[must_use]
    pub fn escaped(&self) -> String {
        escape_case(&self.0)
    }

    fn parts(&self) -> Parts<'_> {
        // Construction guarantees the string parses.
        parse(&self.0).unwrap_or(Parts {
            major: "0",
            minor: "0",
            patch: "0",
            prerelease: "",
            build: "",
        })
    }
}

impl TryFrom<&str> for Version {
    type Error = ProxyError;

    fn try_from(value: &str) -> Result<Self> {
        parse(value).map_err(|reason| invalid(value, reason))?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Version {
    type Error = ProxyError;

    fn try_from(value: String) -> Result<Self> {
        parse(&value).map_err(|reason| invalid(&value, reason))?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn invalid(value: &str, reason: &'static str) -> ProxyError {
    ProxyError::InvalidVersion {
        version: value.to_owned(),
        reason: reason.to_owned(),
    }
}

fn parse(value: &str) -> std::result::Result<Parts<'_>, &'static str> {
    let rest = value
        .strip_prefix('v')
        .ok_or("version must start with \"v\"")?;

    let (major, rest) = take_number(rest).ok_or("missing or malformed major version")?;
    let Some(rest) = rest.strip_prefix('.') else {
        return shorthand(major, "0", rest);
    };
    let (minor, rest) = take_number(rest).ok_or("malformed minor version")?;
    let Some(rest) = rest.strip_prefix('.') else {
        return shorthand(major, minor, rest);
    };
    let (patch, rest) = take_number(rest).ok_or("malformed patch version")?;

    let (prerelease, rest) = if rest.starts_with('-') {
        let end = rest.find('+').unwrap_or(rest.len());
        let (prerelease, tail) = rest.split_at(end);
        check_identifiers(prerelease.strip_prefix('-').unwrap_or(prerelease), true)?;
        (prerelease, tail)
    } else {
        ("", rest)
    };
    let build = match rest.strip_prefix('+') {
        Some(identifiers) => {
            check_identifiers(identifiers, false)?;
            rest
        }
        None if rest.is_empty() => "",
        None => return Err("unexpected characters after patch version"),
    };

    Ok(Parts {
        major,
        minor,
        patch,
        prerelease,
        build,
    })
}

/// `v1` and `v1.2` take no suffixes at all.
fn shorthand<'a>(
    major: &'a str,
    minor: &'a str,
    rest: &str,
) -> std::result::Result<Parts<'a>, &'static str> {
    if !rest.is_empty() {
        return Err("shorthand versions cannot carry pre-release or build suffixes");
    }
    Ok(Parts {
        major,
        minor,
        patch: "0",
        prerelease: "",
        build: "",
    })
}

/// Splits a leading run of digits, rejecting leading zeros.
fn take_number(value: &str) -> Option<(&str, &str)> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, rest) = value.split_at(end);
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    Some((digits, rest))
}

fn check_identifiers(value: &str, numeric_rules: bool) -> std::result::Result<(), &'static str> {
    if value.is_empty() {
        return Err("empty pre-release or build identifier");
    }
    for ident in value.split('.') {
        if ident.is_empty() {
            return Err("empty pre-release or build identifier");
        }
        if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("identifiers may only contain [0-9A-Za-z-]");
        }
        let numeric = ident.chars().all(|c| c.is_ascii_digit());
        if numeric_rules && numeric && ident.len() > 1 && ident.starts_with('0') {
            return Err("numeric pre-release identifiers cannot have leading zeros");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;

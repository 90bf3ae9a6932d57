//! Module paths and module identities.
//!
//! A module path is a slash-separated import path prefix such as
//! `github.com/user/tool/v2`. The proxy protocol stores it on disk with every
//! uppercase letter rewritten as `!` plus its lowercase form so that paths
//! differing only by case stay distinct on case-insensitive filesystems.

use crate::error::{ProxyError, Result};
use crate::version::Version;
use std::fmt;

/// Element names Windows refuses to create, with or without an extension.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Punctuation allowed in file names inside module archives.
const FILE_NAME_PUNCTUATION: &str = "!#$%&()+,-.=@[]^_{}~ ";

/// Which naming rules an element is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    ModulePath,
    FilePath,
}

/// A validated module path.
///
/// # Examples
///
/// ```
/// use modproxy::module::ModulePath;
///
/// let path = ModulePath::try_from("github.com/BurntSushi/toml")?;
/// assert_eq!(path.escaped(), "github.com/!burnt!sushi/toml");
/// # Ok::<(), modproxy::error::ProxyError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    /// Return the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the case-escaped form used for proxy directory names.
    #[must_use]
    pub fn escaped(&self) -> String {
        escape_case(&self.0)
    }

    /// Return the major version suffix: `/vN` for ordinary paths, `.vN` for
    /// `gopkg.in` paths, or `""` when the path has none.
    #[must_use]
    pub fn major_suffix(&self) -> &str {
        split_path_version(&self.0).map_or("", |(_, suffix)| suffix)
    }
}

impl TryFrom<&str> for ModulePath {
    type Error = ProxyError;

    fn try_from(value: &str) -> Result<Self> {
        check_module_path(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for ModulePath {
    type Error = ProxyError;

    fn try_from(value: String) -> Result<Self> {
        check_module_path(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A module path paired with one of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleVersion {
    path: ModulePath,
    version: Version,
}

impl ModuleVersion {
    /// Pair a path with a version, checking that the version's major agrees
    /// with the path's major suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::VersionPathMismatch`] when, for example, a `v2`
    /// version is paired with a path lacking `/v2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use modproxy::module::{ModulePath, ModuleVersion};
    /// use modproxy::version::Version;
    ///
    /// let path = ModulePath::try_from("example.com/foo/v2")?;
    /// let ok = ModuleVersion::new(path.clone(), Version::try_from("v2.1.0")?);
    /// assert!(ok.is_ok());
    /// let mismatch = ModuleVersion::new(path, Version::try_from("v1.0.0")?);
    /// assert!(mismatch.is_err());
    /// # Ok::<(), modproxy::error::ProxyError>(())
    /// ```
    pub fn new(path: ModulePath, version: Version) -> Result<Self> {
        check_path_major(&path, &version)?;
        Ok(Self { path, version })
    }

    /// Parse and pair a path and version in one step.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either part is malformed or they
    /// disagree on the major version.
    pub fn parse(path: &str, version: &str) -> Result<Self> {
        Self::new(ModulePath::try_from(path)?, Version::try_from(version)?)
    }

    /// The module path.
    #[must_use]
    pub const fn path(&self) -> &ModulePath {
        &self.path
    }

    /// The module version.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Prefix for every entry in this module's archive.
    #[must_use]
    pub fn archive_prefix(&self) -> String {
        format!("{}@{}/", self.path, self.version)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// Rewrite each ASCII uppercase letter as `!` followed by its lowercase form.
pub(crate) fn escape_case(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Validate a slash-separated file path inside a module tree.
///
/// # Errors
///
/// Returns [`ProxyError::InvalidFilePath`] naming the violated rule.
pub fn check_file_path(path: &str) -> Result<()> {
    check_elements(path, ElementKind::FilePath).map_err(|reason| ProxyError::InvalidFilePath {
        path: path.to_owned(),
        reason,
    })
}

fn check_module_path(path: &str) -> Result<()> {
    let invalid = |reason: String| ProxyError::InvalidModulePath {
        path: path.to_owned(),
        reason,
    };

    check_elements(path, ElementKind::ModulePath).map_err(invalid)?;

    let first = path.split('/').next().unwrap_or(path);
    if !first.contains('.') {
        return Err(invalid("missing dot in first path element".to_owned()));
    }
    if first.starts_with('-') {
        return Err(invalid("leading dash in first path element".to_owned()));
    }
    if let Some(bad) = first
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
    {
        return Err(invalid(format!(
            "invalid char '{bad}' in first path element"
        )));
    }
    if split_path_version(path).is_none() {
        return Err(invalid("invalid version suffix".to_owned()));
    }
    Ok(())
}

fn check_elements(path: &str, kind: ElementKind) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("empty string".to_owned());
    }
    if path.starts_with('/') {
        return Err("leading slash".to_owned());
    }
    if path.contains("//") {
        return Err("double slash".to_owned());
    }
    if path.ends_with('/') {
        return Err("trailing slash".to_owned());
    }
    path.split('/').try_for_each(|elem| check_element(elem, kind))
}

fn check_element(elem: &str, kind: ElementKind) -> std::result::Result<(), String> {
    if elem.chars().all(|c| c == '.') {
        return Err(format!("invalid path element \"{elem}\""));
    }
    if kind == ElementKind::ModulePath && elem.starts_with('.') {
        return Err(format!("leading dot in path element \"{elem}\""));
    }
    if elem.ends_with('.') {
        return Err(format!("trailing dot in path element \"{elem}\""));
    }
    let allowed = match kind {
        ElementKind::ModulePath => module_char_ok,
        ElementKind::FilePath => file_char_ok,
    };
    if let Some(bad) = elem.chars().find(|c| !allowed(*c)) {
        return Err(format!("invalid char '{bad}'"));
    }

    let short = elem.split('.').next().unwrap_or(elem);
    if WINDOWS_RESERVED
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(short))
    {
        return Err(format!("\"{short}\" disallowed as path element component on Windows"));
    }
    if kind == ElementKind::ModulePath {
        if let Some((_, digits)) = short.rsplit_once('~') {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("trailing tilde and digits in path element \"{elem}\""));
            }
        }
    }
    Ok(())
}

const fn module_char_ok(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

fn file_char_ok(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || FILE_NAME_PUNCTUATION.contains(c)
    } else {
        c.is_alphabetic()
    }
}

/// Split a module path into its prefix and major version suffix.
///
/// Returns `None` when the path carries a malformed suffix such as `/v1`,
/// `/v01` or `/v2.0`.
fn split_path_version(path: &str) -> Option<(&str, &str)> {
    if path.starts_with("gopkg.in/") {
        return split_gopkg_in(path);
    }
    let head = path.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    let (_, tail) = path.split_at(head.len());
    let Some(prefix) = head.strip_suffix("/v") else {
        return Some((path, ""));
    };
    if tail.is_empty() {
        return Some((path, ""));
    }
    if tail.contains('.') || tail.starts_with('0') || tail == "1" {
        return None;
    }
    let (_, suffix) = path.split_at(prefix.len());
    Some((prefix, suffix))
}

fn split_gopkg_in(path: &str) -> Option<(&str, &str)> {
    let stable = path.strip_suffix("-unstable").unwrap_or(path);
    let head = stable.trim_end_matches(|c: char| c.is_ascii_digit());
    let prefix = head.strip_suffix(".v")?;
    let (_, suffix) = path.split_at(prefix.len());
    let digits = suffix
        .trim_start_matches(".v")
        .trim_end_matches("-unstable");
    if digits.is_empty() || (digits.starts_with('0') && digits != "0") {
        return None;
    }
    Some((prefix, suffix))
}

fn check_path_major(path: &ModulePath, version: &Version) -> Result<()> {
    let mismatch = |reason: String| ProxyError::VersionPathMismatch {
        path: path.to_string(),
        version: version.to_string(),
        reason,
    };

    let suffix = path.major_suffix();
    let suffix = if suffix.starts_with(".v") {
        suffix.trim_end_matches("-unstable")
    } else {
        suffix
    };
    if version.as_str().starts_with("v0.0.0-") && suffix == ".v1" {
        return Ok(());
    }

    let major = version.major();
    if suffix.is_empty() {
        if major == "v0" || major == "v1" || version.build() == "+incompatible" {
            return Ok(());
        }
        return Err(mismatch(format!(
            "should be v0 or v1, not {major}; add a /{major} suffix to the module path"
        )));
    }

    let expected = suffix.trim_start_matches(['/', '.']);
    if major == expected {
        return Ok(());
    }
    Err(mismatch(format!("should be {expected}, not {major}")))
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;

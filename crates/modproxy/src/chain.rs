//! Proxy chain composition.
//!
//! The Go toolchain consults `GOPROXY` entries left to right, so putting the
//! local proxy first makes it answer for the fabricated version while every
//! other module still resolves through the user's usual proxies. The module
//! is also exempted from checksum database lookups, since the checksum
//! database has never seen the fabricated version.

use crate::error::{ProxyError, Result};
use camino::Utf8Path;
use log::debug;
use url::Url;

/// Proxy list variable.
pub const GOPROXY: &str = "GOPROXY";

/// Checksum database exemption variable.
pub const GONOSUMDB: &str = "GONOSUMDB";

/// Fallback for [`GONOSUMDB`] when it is unset.
pub const GOPRIVATE: &str = "GOPRIVATE";

/// The Go toolchain's proxy list when `GOPROXY` is unset or empty.
pub const DEFAULT_GOPROXY: &str = "https://proxy.golang.org,direct";

/// Prepend `addition` to a comma-separated list.
///
/// An unset or empty `existing` value falls back to `default`; when that is
/// empty too, the result is `addition` alone.
///
/// # Examples
///
/// ```
/// use modproxy::chain::merge_value;
///
/// assert_eq!(merge_value(None, "a", "b,c"), "a,b,c");
/// assert_eq!(merge_value(Some("x"), "a", "b,c"), "a,x");
/// assert_eq!(merge_value(Some(""), "a", ""), "a");
/// ```
#[must_use]
pub fn merge_value(existing: Option<&str>, addition: &str, default: &str) -> String {
    let base = existing.filter(|value| !value.is_empty()).unwrap_or(default);
    if base.is_empty() {
        addition.to_owned()
    } else {
        format!("{addition},{base}")
    }
}

/// Express `dir` as a `file://` URL with a trailing slash.
///
/// # Errors
///
/// Returns [`ProxyError::InvalidDirectory`] when `dir` is not absolute.
pub fn file_url(dir: &Utf8Path) -> Result<Url> {
    Url::from_directory_path(dir.as_std_path()).map_err(|()| ProxyError::InvalidDirectory {
        path: dir.to_owned(),
        reason: "path must be absolute".to_owned(),
    })
}

/// Read `key` from the current process environment, as a lookup for
/// [`GoEnv::compose`].
///
/// Unset and non-Unicode values both read as `None`.
#[must_use]
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Environment overrides for a Go toolchain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoEnv {
    /// New `GOPROXY` value with the local proxy first.
    pub goproxy: String,
    /// New `GONOSUMDB` value with the module first.
    pub gonosumdb: String,
}

impl GoEnv {
    /// Compose overrides that route `module_path` through the proxy at
    /// `proxy_root`, reading the current settings through `lookup`.
    ///
    /// `GONOSUMDB` inherits from `GOPRIVATE` when it is unset or empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidDirectory`] when `proxy_root` cannot be
    /// turned into a `file://` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use modproxy::chain::GoEnv;
    ///
    /// let env = GoEnv::compose(Utf8Path::new("/tmp/proxy"), "example.com/foo", |key| {
    ///     (key == "GOPRIVATE").then(|| "corp.example".to_owned())
    /// })?;
    /// assert_eq!(env.goproxy, "file:///tmp/proxy,https://proxy.golang.org,direct");
    /// assert_eq!(env.gonosumdb, "example.com/foo,corp.example");
    /// # Ok::<(), modproxy::error::ProxyError>(())
    /// ```
    pub fn compose<F>(proxy_root: &Utf8Path, module_path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = file_url(proxy_root)?;
        let proxy = url.as_str().trim_end_matches('/');

        let goproxy = merge_value(lookup(GOPROXY).as_deref(), proxy, DEFAULT_GOPROXY);
        let nosumdb_base = lookup(GONOSUMDB)
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(GOPRIVATE));
        let gonosumdb = merge_value(nosumdb_base.as_deref(), module_path, "");

        debug!("{GOPROXY}={goproxy}");
        debug!("{GONOSUMDB}={gonosumdb}");
        Ok(Self { goproxy, gonosumdb })
    }

    /// Variable assignments to apply to a child process.
    #[must_use]
    pub fn vars(&self) -> [(&'static str, &str); 2] {
        [(GOPROXY, &self.goproxy), (GONOSUMDB, &self.gonosumdb)]
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;

//! Version descriptor files: `list`, `.mod`, `.info` and `@latest`.
//!
//! `list` is appended to so several versions of one module can share a
//! proxy root. The other files are written through a temporary sibling and
//! renamed into place, so a reader never sees a half-written descriptor.

use crate::error::{ProxyError, Result};
use crate::layout::ProxyLayout;
use crate::module::ModuleVersion;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::NamedTempFile;

/// The two-field record served for `.info` and `@latest` queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoRecord {
    /// The version being described.
    pub version: String,
    /// RFC 3339 UTC timestamp, second precision.
    pub time: String,
}

impl InfoRecord {
    /// Describe `version` as published at `time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use modproxy::metadata::InfoRecord;
    ///
    /// let time = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
    /// let record = InfoRecord::new("v1.0.0", time);
    /// assert_eq!(record.time, "2023-01-01T12:00:00Z");
    /// ```
    #[must_use]
    pub fn new(version: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            time: time.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Describe `version` as published now.
    #[must_use]
    pub fn now(version: impl Into<String>) -> Self {
        Self::new(version, Utc::now())
    }

    /// Render the record as `{"Version": "<v>", "Time":"<t>"}`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a field cannot be encoded.
    pub fn render(&self) -> serde_json::Result<String> {
        Ok(format!(
            "{{\"Version\": {}, \"Time\":{}}}",
            serde_json::to_string(&self.version)?,
            serde_json::to_string(&self.time)?
        ))
    }

    /// Parse a record previously written by [`InfoRecord::render`] or by any
    /// other proxy.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed JSON.
    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Append `version` to the version list unless it is already listed.
///
/// Returns `true` when a line was added.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] naming the list file on any failure.
pub fn append_version(list_path: &Utf8Path, version: &str) -> Result<bool> {
    match fs::read_to_string(list_path) {
        Ok(existing) if existing.lines().any(|line| line.trim() == version) => {
            trace!("{version} already listed in {list_path}");
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ProxyError::io(list_path, e)),
    }

    let mut list = OpenOptions::new()
        .create(true)
        .append(true)
        .open(list_path)
        .map_err(|e| ProxyError::io(list_path, e))?;
    writeln!(list, "{version}").map_err(|e| ProxyError::io(list_path, e))?;
    Ok(true)
}

/// Write `contents` to `path` by way of a temporary sibling and a rename.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] naming `path` on any failure.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Utf8Path::new("."));
    let mut staging = tempfile::Builder::new()
        .prefix(".desc-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| ProxyError::io(path, e))?;
    staging
        .write_all(contents)
        .map_err(|e| ProxyError::io(path, e))?;
    persist_served(staging, path)
}

/// Mode of every file served from a proxy root.
#[cfg(unix)]
const SERVED_MODE: u32 = 0o644;

/// Make `staging` world-readable and rename it to `path`.
pub(crate) fn persist_served(staging: NamedTempFile, path: &Utf8Path) -> Result<()> {
    set_served_permissions(staging.as_file()).map_err(|e| ProxyError::io(path, e))?;
    staging
        .persist(path)
        .map_err(|e| ProxyError::io(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_served_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(SERVED_MODE))
}

#[cfg(not(unix))]
#[expect(
    clippy::unnecessary_wraps,
    reason = "matches the fallible Unix implementation"
)]
fn set_served_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Write the descriptors for `module`: list entry, `.mod`, `.info`, and
/// `@latest` when the version is a pseudo-version.
///
/// The version directory must already exist. Returns the files written, in
/// write order.
///
/// # Errors
///
/// Stops at the first failure and returns it; files written before the
/// failure are left in place.
pub fn write_descriptors(
    layout: &ProxyLayout,
    module: &ModuleVersion,
    manifest: &[u8],
    info: &InfoRecord,
) -> Result<Vec<Utf8PathBuf>> {
    let version = module.version();
    let mut written = Vec::with_capacity(4);

    let list_path = layout.list_path();
    append_version(&list_path, version.as_str())?;
    written.push(list_path);

    let mod_path = layout.mod_path();
    write_atomic(&mod_path, manifest)?;
    written.push(mod_path);

    let info_path = layout.info_path();
    let rendered = info
        .render()
        .map_err(|e| ProxyError::io(&info_path, std::io::Error::other(e)))?;
    write_atomic(&info_path, rendered.as_bytes())?;
    written.push(info_path);

    if version.is_pseudo() {
        let latest_path = layout.latest_path();
        write_atomic(&latest_path, rendered.as_bytes())?;
        written.push(latest_path);
    }

    debug!("wrote {} descriptor file(s) for {module}", written.len());
    Ok(written)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;

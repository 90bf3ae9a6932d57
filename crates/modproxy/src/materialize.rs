//! Assemble a servable proxy directory for one module version.

use crate::archive;
use crate::error::{ProxyError, Result};
use crate::layout::ProxyLayout;
use crate::metadata::{self, InfoRecord};
use crate::module::ModuleVersion;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;

/// File name of the module manifest.
pub const MANIFEST_FILE: &str = "go.mod";

/// Prefix of generated proxy root directories.
const ROOT_PREFIX: &str = "installas-";

/// A proxy directory that serves one module version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDir {
    root: Utf8PathBuf,
    layout: ProxyLayout,
    written: Vec<Utf8PathBuf>,
}

impl ProxyDir {
    /// The proxy root, suitable for a `file://` proxy URL.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Where each served file lives.
    #[must_use]
    pub const fn layout(&self) -> &ProxyLayout {
        &self.layout
    }

    /// Files written by this materialization, in write order.
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }
}

/// Create a fresh, uniquely named proxy root in the system temp directory.
///
/// The directory is left on disk after the call returns so the Go toolchain
/// can read it; removing it is the caller's business.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the directory cannot be created and
/// [`ProxyError::InvalidDirectory`] if its path is not UTF-8.
pub fn create_root() -> Result<Utf8PathBuf> {
    let temp = std::env::temp_dir();
    let dir = tempfile::Builder::new()
        .prefix(ROOT_PREFIX)
        .disable_cleanup(true)
        .tempdir()
        .map_err(|e| ProxyError::io(temp.to_string_lossy().into_owned(), e))?;
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).map_err(|path| {
        ProxyError::InvalidDirectory {
            path: Utf8PathBuf::from(path.to_string_lossy().into_owned()),
            reason: "path is not valid UTF-8".to_owned(),
        }
    })
}

/// Materialize `module` from `source_dir` into a new temporary proxy root.
///
/// # Errors
///
/// See [`materialize_into`]. Root creation failures are reported as in
/// [`create_root`].
pub fn materialize(module: &ModuleVersion, source_dir: &Utf8Path) -> Result<ProxyDir> {
    let root = create_root()?;
    materialize_into(&root, module, source_dir)
}

/// Materialize `module` from `source_dir` into the existing proxy `root`.
///
/// The manifest is read and the source tree validated before anything is
/// written, so invalid input leaves `root` untouched. The version is
/// appended to an existing `list`, so one root can serve several versions
/// of a module.
///
/// # Errors
///
/// Returns [`ProxyError::MissingManifest`] when `source_dir` has no
/// `go.mod`, a validation error when the tree cannot be archived, and
/// [`ProxyError::Io`] or [`ProxyError::Archive`] naming the file that could
/// not be written.
pub fn materialize_into(
    root: &Utf8Path,
    module: &ModuleVersion,
    source_dir: &Utf8Path,
) -> Result<ProxyDir> {
    let info = InfoRecord::now(module.version().as_str());
    materialize_with(root, module, source_dir, &info)
}

/// As [`materialize_into`], recording `info` as the version's metadata.
///
/// # Errors
///
/// See [`materialize_into`].
pub fn materialize_with(
    root: &Utf8Path,
    module: &ModuleVersion,
    source_dir: &Utf8Path,
    info: &InfoRecord,
) -> Result<ProxyDir> {
    let manifest = read_manifest(source_dir)?;
    archive::require_canonical(module)?;
    let files = archive::collect_files(source_dir)?;
    debug!("{} file(s) selected from {source_dir}", files.len());

    let layout = ProxyLayout::new(root, module);
    let version_dir = layout.version_dir();
    fs::create_dir_all(&version_dir).map_err(|e| ProxyError::io(&version_dir, e))?;

    let mut written = metadata::write_descriptors(&layout, module, &manifest, info)?;
    let zip_path = layout.zip_path();
    archive::create_from_files(&zip_path, module, &files)?;
    written.push(zip_path);

    info!("materialized {module} in {root}");
    Ok(ProxyDir {
        root: root.to_owned(),
        layout,
        written,
    })
}

fn read_manifest(source_dir: &Utf8Path) -> Result<Vec<u8>> {
    let path = source_dir.join(MANIFEST_FILE);
    match fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ProxyError::MissingManifest { path }),
        Err(e) => Err(ProxyError::io(path, e)),
    }
}

#[cfg(test)]
#[path = "materialize_tests.rs"]
mod tests;

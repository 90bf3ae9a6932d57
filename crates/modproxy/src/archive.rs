//! Module zip creation.
//!
//! Packs a module source tree into the zip layout `go mod download`
//! expects: every entry lives under `<module>@<version>/`, there are no
//! directory entries, and nested modules, VCS metadata, vendored packages
//! and non-regular files are left out. Entries carry a fixed timestamp and
//! mode so the same tree always produces the same bytes.

use crate::error::{ProxyError, Result};
use crate::metadata::persist_served;
use crate::module::{ModuleVersion, check_file_path};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::io::{self, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Maximum total uncompressed size of a module's files.
pub const MAX_ZIP_FILE: u64 = 500 << 20;

/// Maximum size of the module's `go.mod`.
pub const MAX_GO_MOD: u64 = 16 << 20;

/// Maximum size of the module's root `LICENSE`.
pub const MAX_LICENSE: u64 = 16 << 20;

/// Name of the module manifest at the module root.
const MANIFEST: &str = "go.mod";

/// Directories holding version-control metadata.
const VCS_DIRS: &[&str] = &[".bzr", ".git", ".hg", ".svn"];

/// Metadata file written at the root by `hg archive`.
const HG_ARCHIVAL: &str = ".hg_archival.txt";

/// A file selected for inclusion in a module archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Slash-separated path relative to the module root.
    pub relative: String,
    /// Location of the file on disk.
    pub source: Utf8PathBuf,
    /// Size reported by the filesystem when the tree was scanned.
    pub size: u64,
}

/// Walk `source_dir` and return the files that belong in the module zip,
/// sorted by path.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if a directory cannot be read and a
/// validation error for unusable file names, case collisions, or files over
/// the size limits.
pub fn collect_files(source_dir: &Utf8Path) -> Result<Vec<ArchiveFile>> {
    let mut files = Vec::new();
    walk(source_dir, source_dir, &mut files)?;
    check_files(&files)?;
    Ok(files)
}

fn walk(root: &Utf8Path, dir: &Utf8Path, files: &mut Vec<ArchiveFile>) -> Result<()> {
    let mut entries = dir
        .read_dir_utf8()
        .map_err(|e| ProxyError::io(dir, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| ProxyError::io(dir, e))?;
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ProxyError::io(path, e))?;

        if file_type.is_dir() {
            if VCS_DIRS.contains(&entry.file_name()) {
                trace!("skipping VCS directory {path}");
                continue;
            }
            if is_nested_module(path) {
                debug!("skipping nested module at {path}");
                continue;
            }
            walk(root, path, files)?;
            continue;
        }

        if !file_type.is_file() {
            debug!("skipping non-regular file {path}");
            continue;
        }

        let relative = relative_slash_path(root, path);
        if relative == HG_ARCHIVAL {
            trace!("skipping {relative}");
            continue;
        }
        if is_vendored_package(&relative) {
            trace!("skipping vendored file {relative}");
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| ProxyError::io(path, e))?
            .len();
        files.push(ArchiveFile {
            relative,
            source: path.to_owned(),
            size,
        });
    }
    Ok(())
}

/// A subdirectory with its own `go.mod` belongs to a different module.
fn is_nested_module(dir: &Utf8Path) -> bool {
    fs::symlink_metadata(dir.join(MANIFEST)).is_ok_and(|meta| !meta.is_dir())
}

/// Files inside `vendor/<package>/` are excluded; `vendor/modules.txt` is kept.
///
/// Below a nested `vendor/` directory the package check starts at a fixed
/// offset rather than after the directory name, which excludes every file
/// there. The `go` command does the same and existing module checksums
/// depend on it (golang.org/issue/31562).
fn is_vendored_package(relative: &str) -> bool {
    let offset = if relative.starts_with("vendor/") {
        "vendor/".len()
    } else if relative.contains("/vendor/") {
        "/vendor/".len()
    } else {
        return false;
    };
    relative
        .as_bytes()
        .get(offset..)
        .is_some_and(|rest| rest.contains(&b'/'))
}

fn relative_slash_path(root: &Utf8Path, path: &Utf8Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn check_files(files: &[ArchiveFile]) -> Result<()> {
    let mut folded = HashMap::with_capacity(files.len());
    let mut total: u64 = 0;

    for file in files {
        check_file_path(&file.relative)?;
        check_manifest_case(&file.relative)?;
        check_collisions(&mut folded, &file.relative)?;
        check_size(file)?;

        total = total.saturating_add(file.size);
        if total > MAX_ZIP_FILE {
            return Err(ProxyError::FileTooLarge {
                what: "module source tree".to_owned(),
                size: total,
                limit: MAX_ZIP_FILE,
            });
        }
    }
    Ok(())
}

fn check_manifest_case(relative: &str) -> Result<()> {
    if relative != MANIFEST && relative.eq_ignore_ascii_case(MANIFEST) {
        return Err(ProxyError::InvalidFilePath {
            path: relative.to_owned(),
            reason: "go.mod files must have lowercase names".to_owned(),
        });
    }
    Ok(())
}

/// Lowercased path mapped to the first spelling seen and whether it was a
/// directory.
type Folded<'a> = HashMap<String, (&'a str, bool)>;

/// Record `relative` and each of its parent directories, failing when one
/// differs from an earlier entry only by case.
fn check_collisions<'a>(folded: &mut Folded<'a>, relative: &'a str) -> Result<()> {
    fold_entry(folded, relative, false)?;
    let mut dir = relative;
    while let Some((parent, _)) = dir.rsplit_once('/') {
        fold_entry(folded, parent, true)?;
        dir = parent;
    }
    Ok(())
}

fn fold_entry<'a>(folded: &mut Folded<'a>, path: &'a str, is_dir: bool) -> Result<()> {
    match folded.entry(path.to_lowercase()) {
        Entry::Occupied(seen) => {
            let (first, first_is_dir) = *seen.get();
            if first != path || first_is_dir != is_dir {
                return Err(ProxyError::PathCollision {
                    first: first.to_owned(),
                    second: path.to_owned(),
                });
            }
        }
        Entry::Vacant(slot) => {
            slot.insert((path, is_dir));
        }
    }
    Ok(())
}

fn check_size(file: &ArchiveFile) -> Result<()> {
    let limit = match file.relative.as_str() {
        MANIFEST => MAX_GO_MOD,
        "LICENSE" => MAX_LICENSE,
        _ => return Ok(()),
    };
    if file.size > limit {
        return Err(ProxyError::FileTooLarge {
            what: file.relative.clone(),
            size: file.size,
            limit,
        });
    }
    Ok(())
}

/// Write `files` as a module zip for `module` into `writer`.
///
/// Returns the writer once the central directory has been written.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if a source file cannot be read (for example
/// because it disappeared after the scan) and [`ProxyError::Archive`] if the
/// zip stream cannot be written. `archive_path` only labels those errors.
pub fn write_archive<W: Write + Seek>(
    writer: W,
    module: &ModuleVersion,
    files: &[ArchiveFile],
    archive_path: &Utf8Path,
) -> Result<W> {
    let zip_error = |source: zip::result::ZipError| ProxyError::Archive {
        path: archive_path.to_owned(),
        source,
    };
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    let prefix = module.archive_prefix();

    let mut zip = ZipWriter::new(writer);
    for file in files {
        let name = format!("{prefix}{}", file.relative);
        trace!("adding {name}");
        zip.start_file(name, options).map_err(zip_error)?;
        let mut source =
            fs::File::open(&file.source).map_err(|e| ProxyError::io(&file.source, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| ProxyError::io(&file.source, e))?;
    }
    zip.finish().map_err(zip_error)
}

/// Fail unless `module` carries a canonical version.
///
/// # Errors
///
/// Returns [`ProxyError::NonCanonicalVersion`] naming the canonical spelling.
pub fn require_canonical(module: &ModuleVersion) -> Result<()> {
    let version = module.version();
    if version.is_canonical() {
        return Ok(());
    }
    Err(ProxyError::NonCanonicalVersion {
        version: version.to_string(),
        canonical: version.canonical(),
    })
}

/// Write an archive of already collected `files` at `output`.
///
/// The archive is assembled in a temporary file beside `output` and renamed
/// into place once complete, so `output` either holds a whole archive or
/// does not exist.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the staging file cannot be created or
/// renamed, plus any error from [`write_archive`].
pub fn create_from_files(
    output: &Utf8Path,
    module: &ModuleVersion,
    files: &[ArchiveFile],
) -> Result<usize> {
    let parent = output.parent().unwrap_or(Utf8Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(".zip-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| ProxyError::io(parent, e))?;

    let staging = write_archive(staging, module, files, output)?;
    staging
        .as_file()
        .sync_all()
        .map_err(|e| ProxyError::io(output, e))?;
    persist_served(staging, output)?;

    debug!("wrote {} entries to {output}", files.len());
    Ok(files.len())
}

/// Return the entry names stored in a zip archive, in archive order.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the file cannot be opened and
/// [`ProxyError::Archive`] if it is not a readable zip.
pub fn list_entries(archive_path: &Utf8Path) -> Result<Vec<String>> {
    let zip_error = |source: zip::result::ZipError| ProxyError::Archive {
        path: archive_path.to_owned(),
        source,
    };
    let file = fs::File::open(archive_path).map_err(|e| ProxyError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(zip_error)?;
    (0..archive.len())
        .map(|index| {
            archive
                .by_index(index)
                .map(|entry| entry.name().to_owned())
                .map_err(zip_error)
        })
        .collect()
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;

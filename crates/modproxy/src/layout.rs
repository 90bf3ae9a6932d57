//! File locations inside a proxy directory.
//!
//! ```text
//! <root>/<escaped-module>/@v/list
//! <root>/<escaped-module>/@v/<escaped-version>.mod
//! <root>/<escaped-module>/@v/<escaped-version>.info
//! <root>/<escaped-module>/@v/<escaped-version>.zip
//! <root>/<escaped-module>/@latest
//! ```

use crate::module::ModuleVersion;
use camino::{Utf8Path, Utf8PathBuf};

/// Name of the version list file.
pub const LIST_FILE: &str = "list";

/// Name of the latest-version query file.
pub const LATEST_FILE: &str = "@latest";

/// Name of the per-module version directory.
pub const VERSION_DIR: &str = "@v";

/// Paths for one module version within a proxy root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyLayout {
    module_dir: Utf8PathBuf,
    stem: String,
}

impl ProxyLayout {
    /// Compute the layout of `module` under `root`.
    ///
    /// Module path elements become nested directories, with uppercase
    /// letters escaped.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use modproxy::layout::ProxyLayout;
    /// use modproxy::module::ModuleVersion;
    ///
    /// let module = ModuleVersion::parse("github.com/Org/tool", "v1.0.0")?;
    /// let layout = ProxyLayout::new(Utf8Path::new("/tmp/proxy"), &module);
    /// assert!(layout.zip_path().ends_with("github.com/!org/tool/@v/v1.0.0.zip"));
    /// # Ok::<(), modproxy::error::ProxyError>(())
    /// ```
    #[must_use]
    pub fn new(root: &Utf8Path, module: &ModuleVersion) -> Self {
        let escaped = module.path().escaped();
        let module_dir = escaped
            .split('/')
            .fold(root.to_owned(), |dir, element| dir.join(element));
        Self {
            module_dir,
            stem: module.version().escaped(),
        }
    }

    /// `<root>/<escaped-module>`.
    #[must_use]
    pub fn module_dir(&self) -> &Utf8Path {
        &self.module_dir
    }

    /// `<root>/<escaped-module>/@v`.
    #[must_use]
    pub fn version_dir(&self) -> Utf8PathBuf {
        self.module_dir.join(VERSION_DIR)
    }

    /// The append-only version list.
    #[must_use]
    pub fn list_path(&self) -> Utf8PathBuf {
        self.version_dir().join(LIST_FILE)
    }

    /// The copied `go.mod`.
    #[must_use]
    pub fn mod_path(&self) -> Utf8PathBuf {
        self.version_file("mod")
    }

    /// The version metadata record.
    #[must_use]
    pub fn info_path(&self) -> Utf8PathBuf {
        self.version_file("info")
    }

    /// The module source archive.
    #[must_use]
    pub fn zip_path(&self) -> Utf8PathBuf {
        self.version_file("zip")
    }

    /// The latest-version query answer.
    #[must_use]
    pub fn latest_path(&self) -> Utf8PathBuf {
        self.module_dir.join(LATEST_FILE)
    }

    fn version_file(&self, extension: &str) -> Utf8PathBuf {
        self.version_dir().join(format!("{}.{extension}", self.stem))
    }
}

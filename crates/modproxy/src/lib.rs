//! Single-version, file-backed Go module proxy.
//!
//! Given a module source tree and an arbitrary version string, this crate
//! writes the files a `file://` entry in `GOPROXY` must serve for the Go
//! toolchain to resolve that version: the version list, the copied
//! `go.mod`, the `.info` record, the module zip, and `@latest` for
//! pseudo-versions. It then composes the `GOPROXY`/`GONOSUMDB` values that
//! put the local proxy in front of the user's usual chain.
//!
//! # Modules
//!
//! - [`archive`] - Module zip creation
//! - [`chain`] - Proxy chain composition
//! - [`error`] - Error types
//! - [`layout`] - File locations inside a proxy directory
//! - [`materialize`] - Proxy directory assembly
//! - [`metadata`] - Version list and descriptor files
//! - [`module`] - Module paths, identities and archive file names
//! - [`version`] - Go-flavoured semantic versions

pub mod archive;
pub mod chain;
pub mod error;
pub mod layout;
pub mod materialize;
pub mod metadata;
pub mod module;
pub mod version;

pub use chain::GoEnv;
pub use error::{ProxyError, Result};
pub use materialize::{ProxyDir, materialize, materialize_into};
pub use module::{ModulePath, ModuleVersion};
pub use version::Version;

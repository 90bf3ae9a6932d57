//! installas library.
//!
//! Installs a Go binary with a fabricated version stamp: the current module
//! is served at the requested version from a temporary local module proxy,
//! and `go install <package>@<version>` runs with that proxy first in
//! `GOPROXY`. Used by the `installas` binary and by tests that drive the flow
//! with a stub executor.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Error types
//! - [`exec`] - Subprocess execution abstraction
//! - [`golist`] - Package inspection through `go list`
//! - [`install`] - The install flow
//! - [`output`] - User-facing text
//! - [`target`] - The `[package]@version` target argument

pub mod cli;
pub mod error;
pub mod exec;
pub mod golist;
pub mod install;
pub mod output;
pub mod target;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

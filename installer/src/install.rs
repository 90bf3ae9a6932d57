//! The install flow: inspect, materialize, compose, launch.

use crate::cli::Cli;
use crate::error::{InstallerError, Result};
use crate::exec::{CommandExecutor, exit_code};
use crate::golist;
use crate::output::{running_message, write_line};
use crate::target::InstallTarget;
use camino::Utf8Path;
use log::info;
use modproxy::{GoEnv, ModuleVersion, materialize, materialize_into};
use std::io::Write;

/// Collaborators of an install run.
pub struct InstallContext<'a> {
    /// Runs `go list` and `go install`.
    pub executor: &'a dyn CommandExecutor,
    /// Reads the Go environment variables the proxy chain is built from.
    pub lookup: &'a dyn Fn(&str) -> Option<String>,
    /// Existing proxy root to publish into; a fresh temporary root when
    /// `None`.
    pub proxy_root: Option<&'a Utf8Path>,
}

/// Install the target named by `cli`, passing its build flags through.
///
/// Returns the exit code of `go install`.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidTarget`] when `cli` holds no arguments,
/// plus any error from [`install`].
pub fn run(cli: &Cli, context: &InstallContext<'_>, stdout: &mut dyn Write) -> Result<i32> {
    let (build_flags, target) = cli.split().ok_or_else(|| InstallerError::InvalidTarget {
        target: String::new(),
    })?;
    let target = InstallTarget::parse(target)?;
    install(context, build_flags, &target, stdout)
}

/// Install `target` at its requested version.
///
/// The module containing the package is served from a local proxy at that
/// version, and `go install <import-path>@<version>` runs with the composed
/// proxy chain. Returns the exit code of `go install`.
///
/// # Errors
///
/// Returns the `go list` errors from [`golist::inspect`],
/// [`InstallerError::Proxy`] when the module cannot be served at the
/// version, and [`InstallerError::Launch`] when `go install` cannot be
/// started. A non-zero exit from `go install` is not an error.
pub fn install(
    context: &InstallContext<'_>,
    build_flags: &[String],
    target: &InstallTarget,
    stdout: &mut dyn Write,
) -> Result<i32> {
    let package = golist::inspect(context.executor, target.package())?;
    let module = ModuleVersion::parse(&package.module_path, target.version().as_str())?;

    let proxy = match context.proxy_root {
        Some(root) => materialize_into(root, &module, &package.module_dir)?,
        None => materialize(&module, &package.module_dir)?,
    };
    let env = GoEnv::compose(proxy.root(), &package.module_path, |key| {
        (context.lookup)(key)
    })?;

    let install_target = format!("{}@{}", package.import_path, target.version());
    let mut args = Vec::with_capacity(build_flags.len() + 2);
    args.push("install");
    args.extend(build_flags.iter().map(String::as_str));
    args.push(&install_target);

    write_line(stdout, running_message("go", &args));
    info!("serving {module} from {}", proxy.root());
    let status = context.executor.status("go", &args, &env.vars())?;
    Ok(exit_code(status))
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;

//! Package inspection through `go list`.

use crate::error::{InstallerError, Result};
use crate::exec::CommandExecutor;
use camino::Utf8PathBuf;
use log::debug;

/// Template printing the import path, module path and module directory on
/// three lines.
pub const LIST_FORMAT: &str = r#"{{printf "%s\n%s\n%s" .ImportPath .Module.Path .Module.Dir -}}"#;

/// What `go list` reports about the package being installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Full import path of the package.
    pub import_path: String,
    /// Path of the module containing the package.
    pub module_path: String,
    /// Root directory of that module.
    pub module_dir: Utf8PathBuf,
}

/// Run `go list` for `package` and parse its answer.
///
/// # Errors
///
/// Returns [`InstallerError::Launch`] if `go` cannot be started,
/// [`InstallerError::GoList`] if it exits unsuccessfully or prints fewer than
/// three lines, and [`InstallerError::NotInModule`] if the package has no
/// module.
pub fn inspect(executor: &dyn CommandExecutor, package: &str) -> Result<PackageInfo> {
    let output = executor.run("go", &["list", "-f", LIST_FORMAT, package])?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => output.status.to_string(),
            trimmed => trimmed.to_owned(),
        };
        return Err(InstallerError::GoList { message });
    }
    let info = parse_output(&String::from_utf8_lossy(&output.stdout))?;
    if info.module_path.is_empty() {
        return Err(InstallerError::NotInModule {
            package: package.to_owned(),
        });
    }
    debug!(
        "{} belongs to {} at {}",
        info.import_path, info.module_path, info.module_dir
    );
    Ok(info)
}

/// Parse the three-line output produced with [`LIST_FORMAT`].
///
/// # Errors
///
/// Returns [`InstallerError::GoList`] when fewer than three lines are
/// present.
pub fn parse_output(stdout: &str) -> Result<PackageInfo> {
    let mut lines = stdout.split('\n').map(str::trim);
    match (lines.next(), lines.next(), lines.next()) {
        (Some(import_path), Some(module_path), Some(module_dir)) => Ok(PackageInfo {
            import_path: import_path.to_owned(),
            module_path: module_path.to_owned(),
            module_dir: Utf8PathBuf::from(module_dir),
        }),
        _ => Err(InstallerError::GoList {
            message: format!("unexpected output:\n{stdout}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, output_with};

    fn list_call(package: &'static str, result: Result<std::process::Output>) -> ExpectedCall {
        ExpectedCall::new("go", ["list", "-f", LIST_FORMAT, package], result)
    }

    #[test]
    fn parses_three_lines() {
        let info = parse_output("example.com/foo/cmd/bar\nexample.com/foo\n/src/foo")
            .expect("three lines");
        assert_eq!(
            info,
            PackageInfo {
                import_path: "example.com/foo/cmd/bar".to_owned(),
                module_path: "example.com/foo".to_owned(),
                module_dir: Utf8PathBuf::from("/src/foo"),
            }
        );
    }

    #[test]
    fn trims_carriage_returns_and_spaces() {
        let info = parse_output("example.com/foo\r\nexample.com/foo\r\nC:\\src\\foo\r\n")
            .expect("three lines");
        assert_eq!(info.module_dir, Utf8PathBuf::from("C:\\src\\foo"));
    }

    #[test]
    fn short_output_is_rejected() {
        let err = parse_output("example.com/foo\nexample.com/foo").expect_err("two lines");
        assert!(matches!(err, InstallerError::GoList { .. }));
    }

    #[test]
    fn inspect_runs_go_list() {
        let executor = StubExecutor::new(vec![list_call(
            "./cmd/bar",
            Ok(output_with(0, "example.com/foo/cmd/bar\nexample.com/foo\n/src/foo")),
        )]);
        let info = inspect(&executor, "./cmd/bar").expect("inspect succeeds");
        assert_eq!(info.import_path, "example.com/foo/cmd/bar");
        executor.assert_finished();
    }

    #[test]
    fn failing_go_list_reports_stderr() {
        let executor = StubExecutor::new(vec![list_call(
            ".",
            Ok(failure_output("go: cannot find main module\n")),
        )]);
        let err = inspect(&executor, ".").expect_err("go list fails");
        assert!(matches!(
            err,
            InstallerError::GoList { ref message } if message == "go: cannot find main module"
        ));
    }

    #[test]
    fn empty_module_path_is_not_in_module() {
        let executor = StubExecutor::new(vec![list_call("fmt", Ok(output_with(0, "fmt\n\n")))]);
        let err = inspect(&executor, "fmt").expect_err("standard library");
        assert!(matches!(err, InstallerError::NotInModule { ref package } if package == "fmt"));
    }
}

//! Subprocess execution.
//!
//! The install flow talks to the Go toolchain only through
//! [`CommandExecutor`], so tests can substitute a stub.

use crate::error::{InstallerError, Result};
use log::debug;
use std::process::{Command, ExitStatus, Output};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Launch`] if the command cannot be started.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use installas::exec::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("go", &["version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), installas::error::InstallerError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;

    /// Runs a command with inherited stdio and extra environment variables,
    /// waiting for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Launch`] if the command cannot be started.
    fn status(&self, cmd: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<ExitStatus>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        debug!("running {cmd} {}", args.join(" "));
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(|source| launch_error(cmd, source))
    }

    fn status(&self, cmd: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<ExitStatus> {
        debug!("running {cmd} {} with {envs:?}", args.join(" "));
        Command::new(cmd)
            .args(args)
            .envs(envs.iter().copied())
            .status()
            .map_err(|source| launch_error(cmd, source))
    }
}

fn launch_error(cmd: &str, source: std::io::Error) -> InstallerError {
    InstallerError::Launch {
        command: cmd.to_owned(),
        source,
    }
}

/// Exit code to report for a finished subprocess.
///
/// Processes killed by a signal have no exit code and map to `1`.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::exit_status;

    #[test]
    fn missing_program_is_a_launch_error() {
        let err = SystemCommandExecutor
            .run("installas-test-no-such-program", &[])
            .expect_err("program does not exist");
        assert!(matches!(
            err,
            InstallerError::Launch { ref command, .. } if command == "installas-test-no-such-program"
        ));
    }

    #[test]
    fn exit_code_is_forwarded() {
        assert_eq!(exit_code(exit_status(0)), 0);
        assert_eq!(exit_code(exit_status(3)), 3);
    }

    #[cfg(unix)]
    #[test]
    fn signalled_processes_report_one() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(9)), 1);
    }
}
